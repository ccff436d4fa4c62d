//! Hysteria Panel: web administration for Hysteria v2 servers
//!
//! The panel keeps Hysteria users and a handful of server settings in SQLite,
//! renders them into the server's YAML configuration and restarts the systemd
//! unit whenever something changes.
//!
//! # Main Features
//!
//! - User management with per-user auth strings, rate caps and quotas
//! - Configuration synthesis with a single/list/placeholder auth field
//! - Apply cycle: synthesize, write, `systemctl restart`
//! - Connection links with QR codes for clients
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hysteria_panel::hysteria::{ApplyController, ConfigWriter};
//! use hysteria_panel::service::SystemdService;
//! use hysteria_panel::store::Store;
//!
//! #[tokio::main]
//! async fn main() -> hysteria_panel::Result<()> {
//!     let store = Store::open(std::path::Path::new("hysteria.db")).await?;
//!     let apply = ApplyController::new(
//!         ConfigWriter::new("/etc/hysteria/config.yaml"),
//!         Arc::new(SystemdService::new("hysteria")),
//!     );
//!
//!     let outcome = apply.apply(&store).await?;
//!     println!("config written: {}", outcome.config_written());
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod console;
pub mod hysteria;
pub mod netinfo;
pub mod service;
pub mod store;

// Re-export commonly used structures and functions for convenience
pub use common::{PanelError, Result};
pub use console::{build_router, start_console_server, ConsoleState};
pub use hysteria::{synthesize, ApplyController, ApplyOutcome};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
