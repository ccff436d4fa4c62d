//! Service manager integration
//!
//! The Hysteria server is supervised by the host service manager; the panel
//! only asks it to restart the unit, whether the unit is running, and for the
//! tail of its journal.

mod systemd;

use async_trait::async_trait;

pub use systemd::SystemdService;

/// Service manager errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The command could not be started at all
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure
    #[error("{command} failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Control surface of the supervised Hysteria process
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Restart the unit so it rereads its configuration.
    async fn restart(&self) -> Result<(), ServiceError>;

    /// Whether the unit is currently running. Display only.
    async fn is_active(&self) -> bool;

    /// The last `lines` journal lines of the unit.
    async fn journal_tail(&self, lines: usize) -> Result<String, ServiceError>;
}
