//! Data models for the record store.

use serde::{Deserialize, Serialize};

/// Panel administrator
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    /// argon2id PHC string
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: Option<String>,
}

/// A Hysteria user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VpnUser {
    pub id: i64,
    pub username: String,
    /// Auth string presented by the client
    pub password: String,
    pub upload_mbps: i64,
    pub download_mbps: i64,
    /// Quota in GB, 0 means unlimited
    pub total_traffic_gb: i64,
    /// Displayed only; nothing in the panel meters traffic
    pub used_traffic_gb: f64,
    pub expiry_date: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub last_online: Option<String>,
}

/// Validated input for creating a user
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub upload_mbps: i64,
    pub download_mbps: i64,
    pub total_traffic_gb: i64,
    pub expiry_date: Option<String>,
}

impl NewUser {
    /// A user with the default caps and no quota
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            upload_mbps: DEFAULT_RATE_MBPS,
            download_mbps: DEFAULT_RATE_MBPS,
            total_traffic_gb: 0,
            expiry_date: None,
        }
    }
}

/// Validated input for editing a user
///
/// `password: None` keeps the stored auth string.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub username: String,
    pub password: Option<String>,
    pub upload_mbps: i64,
    pub download_mbps: i64,
    pub total_traffic_gb: i64,
    pub expiry_date: Option<String>,
    pub is_active: bool,
}

/// Default upload/download cap for new users
pub const DEFAULT_RATE_MBPS: i64 = 100;

/// Dashboard counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub total_used_traffic_gb: f64,
}
