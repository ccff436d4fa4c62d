//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file named explicitly but missing
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Error reading or parsing a source
    #[error("Error parsing configuration: {0}")]
    ParseError(String),

    /// Invalid value for configuration option
    #[error("Invalid value for '{0}': {1}")]
    InvalidValue(String, String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

// Convert to crate's common error type
impl From<ConfigError> for crate::common::PanelError {
    fn from(err: ConfigError) -> Self {
        crate::common::PanelError::Config(err.to_string())
    }
}
