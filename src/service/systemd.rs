//! systemd-backed service manager

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use super::{ServiceError, ServiceManager};

/// Talks to systemd through `systemctl` and `journalctl`
#[derive(Debug, Clone)]
pub struct SystemdService {
    unit: String,
    systemctl: PathBuf,
    journalctl: PathBuf,
}

impl SystemdService {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            systemctl: PathBuf::from("systemctl"),
            journalctl: PathBuf::from("journalctl"),
        }
    }

    /// Use different binaries in place of `systemctl` and `journalctl`.
    pub fn with_binaries(mut self, systemctl: impl Into<PathBuf>, journalctl: impl Into<PathBuf>) -> Self {
        self.systemctl = systemctl.into();
        self.journalctl = journalctl.into();
        self
    }

    async fn run(&self, program: &Path, args: &[&str]) -> Result<Output, ServiceError> {
        let program_name = program.display().to_string();
        debug!("exec: {} {}", program_name, args.join(" "));

        Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| ServiceError::Spawn {
                program: program_name,
                source,
            })
    }

    fn check(program: &Path, args: &[&str], output: Output) -> Result<Output, ServiceError> {
        if output.status.success() {
            return Ok(output);
        }

        Err(ServiceError::Failed {
            command: format!("{} {}", program.display(), args.join(" ")),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl ServiceManager for SystemdService {
    async fn restart(&self) -> Result<(), ServiceError> {
        let args = ["restart", self.unit.as_str()];
        let output = self.run(&self.systemctl, &args).await?;
        Self::check(&self.systemctl, &args, output)?;
        Ok(())
    }

    async fn is_active(&self) -> bool {
        // `is-active` exits non-zero for inactive units; only stdout matters.
        match self.run(&self.systemctl, &["is-active", self.unit.as_str()]).await {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "active",
            Err(e) => {
                debug!("Status probe for {} failed: {}", self.unit, e);
                false
            }
        }
    }

    async fn journal_tail(&self, lines: usize) -> Result<String, ServiceError> {
        let lines = lines.to_string();
        let args = ["-u", self.unit.as_str(), "-n", lines.as_str(), "--no-pager"];
        let output = self.run(&self.journalctl, &args).await?;
        let output = Self::check(&self.journalctl, &args, output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_restart_success_and_failure() {
        let ok = SystemdService::new("hysteria").with_binaries("true", "true");
        assert!(ok.restart().await.is_ok());

        let failing = SystemdService::new("hysteria").with_binaries("false", "false");
        match failing.restart().await {
            Err(ServiceError::Failed { command, .. }) => {
                assert_eq!(command, "false restart hysteria");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let service = SystemdService::new("hysteria")
            .with_binaries("/nonexistent/systemctl", "/nonexistent/journalctl");
        assert!(matches!(service.restart().await, Err(ServiceError::Spawn { .. })));
        assert!(!service.is_active().await);
        assert!(service.journal_tail(10).await.is_err());
    }

    #[tokio::test]
    async fn test_is_active_reads_stdout() {
        // `echo is-active hysteria` prints something other than "active"
        let service = SystemdService::new("hysteria").with_binaries("echo", "echo");
        assert!(!service.is_active().await);
    }

    #[tokio::test]
    async fn test_journal_tail_returns_stdout() {
        let service = SystemdService::new("hysteria").with_binaries("true", "echo");
        let logs = service.journal_tail(100).await.unwrap();
        assert_eq!(logs.trim(), "-u hysteria -n 100 --no-pager");
    }

    #[tokio::test]
    async fn test_journal_tail_non_zero_exit_is_an_error() {
        let service = SystemdService::new("hysteria").with_binaries("true", "false");
        match service.journal_tail(100).await {
            Err(ServiceError::Failed { command, .. }) => {
                assert_eq!(command, "false -u hysteria -n 100 --no-pager");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
