//! Configuration module
//!
//! Process configuration of the console: where the database and the Hysteria
//! configuration live, which systemd unit to drive, and logging. Panel-level
//! settings edited through the web UI are stored in the database instead.

mod defaults;
mod error;
mod loader;
mod types;
mod validator;

pub use defaults::{CONFIG_FILE_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use loader::CliOverrides;
pub use types::ConsoleConfig;
pub use validator::{check_warnings, validate_config};
