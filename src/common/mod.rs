//! Common module
//!
//! This module contains shared errors and utility functions used throughout the application.

pub mod error;
pub mod log;
pub mod net;

// Re-export commonly used types and functions
pub use error::{PanelError, Result};
pub use log::init_logger;
pub use net::{listen_on_port, parse_socket_addr};
