//! JSON payloads of the console API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service state reported by `/api/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Online,
    Offline,
}

impl From<bool> for ServiceStatus {
    fn from(active: bool) -> Self {
        if active {
            ServiceStatus::Online
        } else {
            ServiceStatus::Offline
        }
    }
}

/// `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
}

/// `/api/restart`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartResponse {
    pub success: bool,
    pub message: String,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
