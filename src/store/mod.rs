//! Record store
//!
//! SQLite persistence for administrators, Hysteria users and panel settings.
//! Every mutation runs in its own transaction; there is no caching layer.

mod db;
mod admins;
mod users;
pub mod models;
mod password;
pub mod settings;


pub use db::{Store, StoreError, DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD};
pub use models::{Admin, NewUser, UserStats, UserUpdate, VpnUser, DEFAULT_RATE_MBPS};
pub use settings::{SettingKey, Settings};
