//! Configuration validator

use log::warn;

use super::defaults::LOG_LEVELS;
use super::error::{ConfigError, Result};
use super::types::ConsoleConfig;

/// Validate the configuration
pub fn validate_config(config: &ConsoleConfig) -> Result<()> {
    validate_network_settings(config)?;
    validate_general_settings(config)?;
    Ok(())
}

/// Check configuration for non-fatal issues
pub fn check_warnings(config: &ConsoleConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        warnings.push(format!("Invalid log level '{}', using default 'info'", config.log_level));
    }

    if let Some(parent) = config.hysteria_config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            warnings.push(format!(
                "Hysteria configuration directory does not exist yet: {}",
                parent.display()
            ));
        }
    }

    warnings
}

fn validate_network_settings(config: &ConsoleConfig) -> Result<()> {
    if let Err(e) = config.listen_addr() {
        return Err(ConfigError::InvalidValue("listen".to_string(), e.to_string()));
    }

    let url = config.public_ip_lookup_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue(
            "public_ip_lookup_url".to_string(),
            format!("Expected an http(s) URL, got '{}'", url),
        ));
    }

    if config.lookup_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue(
            "lookup_timeout_secs".to_string(),
            "Lookup timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_general_settings(config: &ConsoleConfig) -> Result<()> {
    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        warn!("Invalid log level: {}. Using default: info", config.log_level);
    }

    if config.log_lines == 0 {
        return Err(ConfigError::InvalidValue(
            "log_lines".to_string(),
            "Log lines must be greater than 0".to_string(),
        ));
    }

    if config.service_unit.trim().is_empty() {
        return Err(ConfigError::InvalidValue(
            "service_unit".to_string(),
            "Service unit must not be empty".to_string(),
        ));
    }

    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue(
            "database_path".to_string(),
            "Database path must not be empty".to_string(),
        ));
    }

    if config.hysteria_config_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue(
            "hysteria_config_path".to_string(),
            "Hysteria configuration path must not be empty".to_string(),
        ));
    }

    Ok(())
}
