//! Console configuration type

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::common::parse_socket_addr;

/// Process configuration of the console
///
/// Every field has a default, so an empty file (or no file at all) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Listen address override; otherwise `0.0.0.0:<panel_port setting>`
    pub listen: Option<String>,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Where the synthesized Hysteria configuration is written
    pub hysteria_config_path: PathBuf,

    /// systemd unit restarted after every change
    pub service_unit: String,

    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,

    /// Journal lines shown on the logs page
    pub log_lines: usize,

    /// HTTP endpoint returning the server's public address as plain text
    pub public_ip_lookup_url: String,

    /// Timeout for each public address lookup stage
    pub lookup_timeout_secs: u64,

    /// File this configuration was loaded from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            listen: None,
            database_path: defaults::database_path(),
            hysteria_config_path: defaults::hysteria_config_path(),
            service_unit: defaults::service_unit(),
            log_level: defaults::log_level(),
            log_lines: defaults::log_lines(),
            public_ip_lookup_url: defaults::public_ip_lookup_url(),
            lookup_timeout_secs: defaults::lookup_timeout_secs(),
            config_file: None,
        }
    }
}

impl ConsoleConfig {
    /// Parsed listen override
    pub fn listen_addr(&self) -> crate::common::Result<Option<SocketAddr>> {
        match self.listen.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(addr) => parse_socket_addr(addr).map(Some),
        }
    }

    /// Public address lookup timeout
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}
