//! Writes the generated document to disk

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::document::HysteriaConfig;

/// Header prepended to every generated file
const GENERATED_HEADER: &str = "# Generated by hysteria-panel. Manual edits are overwritten on the next change.\n";

/// Synthesis failure
///
/// Any of these means the restart must be skipped.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The document could not be rendered
    #[error("failed to render config: {0}")]
    Render(#[from] serde_yaml::Error),

    /// The rendered document could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes documents to one fixed path
#[derive(Debug, Clone)]
pub struct ConfigWriter {
    path: PathBuf,
}

impl ConfigWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render `config` and overwrite the target file in full.
    ///
    /// The parent directory is created when missing. A failure before the
    /// write starts leaves the previous file untouched; a failure during the
    /// write leaves it in an unknown state.
    pub async fn write(&self, config: &HysteriaConfig) -> Result<(), SynthesisError> {
        let mut content = String::from(GENERATED_HEADER);
        content.push_str(&config.to_yaml()?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| self.write_error(source))?;
            }
        }

        tokio::fs::write(&self.path, content.as_bytes())
            .await
            .map_err(|source| self.write_error(source))?;

        debug!("Wrote {} bytes to {}", content.len(), self.path.display());
        info!("Hysteria config written to {}", self.path.display());
        Ok(())
    }

    fn write_error(&self, source: io::Error) -> SynthesisError {
        SynthesisError::Write {
            path: self.path.clone(),
            source,
        }
    }
}
