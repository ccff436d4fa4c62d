//! Default configuration values
//!
//! Single source of truth for the console's process configuration defaults.
//! Record-level defaults (ports, paths shown on the settings page) live with
//! the settings table instead.

use std::path::PathBuf;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "HYSTERIA_PANEL";

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "HYSTERIA_PANEL_CONFIG_FILE";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "hysteria-panel.json";

/// Default database path as string
pub const DATABASE_PATH_STR: &str = "hysteria.db";

/// Default Hysteria configuration path as string
pub const HYSTERIA_CONFIG_PATH_STR: &str = "/etc/hysteria/config.yaml";

/// Default systemd unit
pub const SERVICE_UNIT_STR: &str = "hysteria";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Default public address lookup endpoint
pub const PUBLIC_IP_LOOKUP_URL_STR: &str = "https://api.ipify.org";

/// Recognized log levels
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Default database path
pub fn database_path() -> PathBuf {
    PathBuf::from(DATABASE_PATH_STR)
}

/// Default Hysteria configuration path
pub fn hysteria_config_path() -> PathBuf {
    PathBuf::from(HYSTERIA_CONFIG_PATH_STR)
}

/// Default systemd unit
pub fn service_unit() -> String {
    SERVICE_UNIT_STR.to_string()
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}

/// Journal lines shown on the logs page
pub fn log_lines() -> usize {
    100
}

/// Default public address lookup endpoint
pub fn public_ip_lookup_url() -> String {
    PUBLIC_IP_LOOKUP_URL_STR.to_string()
}

/// Public address lookup timeout in seconds
pub fn lookup_timeout_secs() -> u64 {
    3
}
