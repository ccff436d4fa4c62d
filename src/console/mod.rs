//! Admin console
//!
//! Session-gated web UI over the record store. Every change made here is
//! pushed to the Hysteria server through the apply cycle before the response
//! is sent.
//!
//! # Architecture
//!
//! Handlers are plain axum functions over an explicit [`ConsoleState`]. The
//! session gate is a `from_fn_with_state` middleware on the protected routes;
//! sessions are HMAC-signed cookies and flash messages travel in a second
//! cookie.

pub mod auth;
pub mod error;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod html;
pub mod link;
pub mod server;
pub mod state;
pub mod types;

pub use auth::{SessionKey, SESSION_COOKIE};
pub use error::{ConsoleError, ConsoleResult};
pub use flash::FLASH_COOKIE;
pub use server::{build_router, start_console_server};
pub use state::{normalize_base_path, ConsoleState};
