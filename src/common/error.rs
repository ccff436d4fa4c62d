//! Error handling module
//!
//! This module defines the top-level error type used by the binary and the
//! startup path. Each layer has its own error enum; they all fold into
//! `PanelError` here.

use thiserror::Error;
use std::io;

use crate::store::StoreError;

/// Hysteria panel error type
#[derive(Error, Debug)]
pub enum PanelError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `PanelError`.
pub type Result<T> = std::result::Result<T, PanelError>;
