//! Configuration loader
//!
//! Sources, lowest priority first:
//! 1. Default values
//! 2. JSON configuration file (`hysteria-panel.json` unless named explicitly)
//! 3. `HYSTERIA_PANEL_*` environment variables
//! 4. Command line arguments

use std::env;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use log::debug;

use super::defaults::{CONFIG_FILE_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use super::error::{ConfigError, Result};
use super::types::ConsoleConfig;
use super::validator::validate_config;

/// Values given on the command line
///
/// `None` leaves the lower-priority value in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub listen: Option<String>,
    pub database_path: Option<PathBuf>,
    pub hysteria_config_path: Option<PathBuf>,
    pub service_unit: Option<String>,
    pub log_level: Option<String>,
    pub log_lines: Option<usize>,
}

impl CliOverrides {
    fn apply(&self, config: &mut ConsoleConfig) {
        if let Some(listen) = &self.listen {
            config.listen = Some(listen.clone());
        }
        if let Some(path) = &self.database_path {
            config.database_path = path.clone();
        }
        if let Some(path) = &self.hysteria_config_path {
            config.hysteria_config_path = path.clone();
        }
        if let Some(unit) = &self.service_unit {
            config.service_unit = unit.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(lines) = self.log_lines {
            config.log_lines = lines;
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from every source and validate it.
    ///
    /// A configuration file named on the command line or through
    /// `HYSTERIA_PANEL_CONFIG_FILE` must exist; the default file is optional.
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let named = overrides
            .config_file
            .clone()
            .or_else(|| env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from));

        let path = match named {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path)),
            Some(path) => path,
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let mut config = Self::from_sources(&path)?;
        overrides.apply(&mut config);

        validate_config(&config)?;

        debug!("Configuration loaded and validated successfully");
        Ok(config)
    }

    /// Load configuration from a specific file plus environment, then validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::from_sources(path.as_ref())?;
        validate_config(&config)?;
        Ok(config)
    }

    fn from_sources(path: &Path) -> Result<Self> {
        let built = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let mut config: Self = built.try_deserialize()?;
        if path.exists() {
            debug!("Configuration loaded from {}", path.display());
            config.config_file = Some(path.to_path_buf());
        }

        Ok(config)
    }
}
