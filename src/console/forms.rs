//! Form payloads and their validation
//!
//! Every field is optional at the HTTP level so a sparse form never fails
//! extraction. Validation turns the raw strings into the store's input types:
//! an empty numeric field takes its default, anything else that does not parse
//! is rejected.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::Deserialize;

use crate::store::{NewUser, SettingKey, UserUpdate, VpnUser, DEFAULT_RATE_MBPS};

use super::state::normalize_base_path;

/// Rejected form input, shown to the operator as is
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FormError(pub String);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Add and edit user form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub upload_mbps: String,
    #[serde(default)]
    pub download_mbps: String,
    #[serde(default)]
    pub total_traffic_gb: String,
    #[serde(default)]
    pub expiry_date: String,
    /// Checkbox: present when ticked
    pub is_active: Option<String>,
}

impl UserForm {
    /// Form pre-filled from a stored user; the password field stays empty.
    pub fn from_user(user: &VpnUser) -> Self {
        Self {
            username: user.username.clone(),
            password: String::new(),
            upload_mbps: user.upload_mbps.to_string(),
            download_mbps: user.download_mbps.to_string(),
            total_traffic_gb: user.total_traffic_gb.to_string(),
            expiry_date: user.expiry_date.clone().unwrap_or_default(),
            is_active: user.is_active.then(|| "on".to_string()),
        }
    }

    /// Validate for creation. An empty password is replaced by a random token.
    pub fn into_new_user(self) -> Result<NewUser, FormError> {
        let username = required_username(&self.username)?;
        let password = match self.password.trim() {
            "" => generate_auth_password(),
            password => password.to_string(),
        };

        Ok(NewUser {
            username,
            password,
            upload_mbps: parse_count("Upload speed", &self.upload_mbps, DEFAULT_RATE_MBPS)?,
            download_mbps: parse_count("Download speed", &self.download_mbps, DEFAULT_RATE_MBPS)?,
            total_traffic_gb: parse_count("Traffic limit", &self.total_traffic_gb, 0)?,
            expiry_date: optional(&self.expiry_date),
        })
    }

    /// Validate for an edit. An empty password keeps the stored one.
    pub fn into_update(self) -> Result<UserUpdate, FormError> {
        let username = required_username(&self.username)?;
        let password = optional(&self.password);

        Ok(UserUpdate {
            username,
            password,
            upload_mbps: parse_count("Upload speed", &self.upload_mbps, DEFAULT_RATE_MBPS)?,
            download_mbps: parse_count("Download speed", &self.download_mbps, DEFAULT_RATE_MBPS)?,
            total_traffic_gb: parse_count("Traffic limit", &self.total_traffic_gb, 0)?,
            expiry_date: optional(&self.expiry_date),
            is_active: self.is_active.is_some(),
        })
    }
}

/// Settings page form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub server_port: String,
    #[serde(default)]
    pub panel_port: String,
    #[serde(default)]
    pub panel_path: String,
    #[serde(default)]
    pub server_ip: String,
    #[serde(default)]
    pub cert_path: String,
    #[serde(default)]
    pub key_path: String,
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Validated settings submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsChange {
    /// Non-empty values only
    pub values: Vec<(SettingKey, String)>,
    /// `(old, new)` when both were given
    pub password_change: Option<(String, String)>,
}

impl SettingsForm {
    pub fn validate(self) -> Result<SettingsChange, FormError> {
        let mut values = Vec::new();

        for (key, raw) in [
            (SettingKey::ServerPort, &self.server_port),
            (SettingKey::PanelPort, &self.panel_port),
            (SettingKey::PanelPath, &self.panel_path),
            (SettingKey::ServerIp, &self.server_ip),
            (SettingKey::CertPath, &self.cert_path),
            (SettingKey::KeyPath, &self.key_path),
        ] {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            match key {
                SettingKey::ServerPort | SettingKey::PanelPort => {
                    parse_port(key, value)?;
                }
                SettingKey::PanelPath if normalize_base_path(value).is_none() => {
                    return Err(FormError(format!(
                        "Panel path may only contain letters, digits, '/', '-', '_' and '.': {}",
                        value
                    )));
                }
                _ => {}
            }

            values.push((key, value.to_string()));
        }

        let password_change = match (optional(&self.old_password), optional(&self.new_password)) {
            (Some(old), Some(new)) => Some((old, new)),
            _ => None,
        };

        Ok(SettingsChange { values, password_change })
    }
}

/// Random auth string: 16 random bytes, URL-safe base64
pub fn generate_auth_password() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn required_username(raw: &str) -> Result<String, FormError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(FormError("Username is required".to_string()));
    }
    Ok(username.to_string())
}

fn optional(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_count(label: &str, raw: &str, default: i64) -> Result<i64, FormError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(default);
    }

    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        Ok(_) => Err(FormError(format!("{} must not be negative", label))),
        Err(_) => Err(FormError(format!("{} must be a whole number, got '{}'", label, value))),
    }
}

fn parse_port(key: SettingKey, value: &str) -> Result<u16, FormError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(FormError(format!("{} must be a port number (1-65535), got '{}'", key, value))),
    }
}
