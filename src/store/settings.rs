//! Key-value settings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::db::{Store, StoreError};

/// Settings understood by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    /// Port the Hysteria server listens on
    ServerPort,
    /// Port the panel listens on (read at startup)
    PanelPort,
    /// URL prefix of the panel (read at startup)
    PanelPath,
    /// Public address advertised in connection links
    ServerIp,
    /// TLS certificate path for the Hysteria server
    CertPath,
    /// TLS private key path for the Hysteria server
    KeyPath,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::ServerPort,
        SettingKey::PanelPort,
        SettingKey::PanelPath,
        SettingKey::ServerIp,
        SettingKey::CertPath,
        SettingKey::KeyPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::ServerPort => "server_port",
            SettingKey::PanelPort => "panel_port",
            SettingKey::PanelPath => "panel_path",
            SettingKey::ServerIp => "server_ip",
            SettingKey::CertPath => "cert_path",
            SettingKey::KeyPath => "key_path",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            SettingKey::ServerPort => "443",
            SettingKey::PanelPort => "54321",
            SettingKey::PanelPath => "/hysteria",
            SettingKey::ServerIp => "",
            SettingKey::CertPath => "/etc/hysteria/cert.crt",
            SettingKey::KeyPath => "/etc/hysteria/private.key",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StoreError::NotFound(format!("setting {}", s)))
    }
}

/// Snapshot of the settings table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Raw stored value, if any
    pub fn raw(&self, key: SettingKey) -> Option<&str> {
        self.values.get(key.as_str()).map(String::as_str)
    }

    /// Stored value, or the key's default when absent or NULL
    pub fn get(&self, key: SettingKey) -> &str {
        self.raw(key).unwrap_or_else(|| key.default_value())
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key.as_str().to_string(), value.into());
    }
}

impl FromIterator<(SettingKey, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (SettingKey, String)>>(iter: I) -> Self {
        let mut settings = Settings::default();
        for (key, value) in iter {
            settings.set(key, value);
        }
        settings
    }
}

impl Store {
    /// Load every stored setting.
    pub async fn load_settings(&self) -> Result<Settings, StoreError> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT key, value FROM settings")
                .fetch_all(self.pool())
                .await?;

        let values = rows
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

        Ok(Settings { values })
    }

    /// Upsert the given settings in one transaction.
    ///
    /// Empty values mean "no change" and are skipped. Returns the number of
    /// keys written.
    pub async fn update_settings<I>(&self, changes: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = (SettingKey, String)>,
    {
        let mut tx = self.pool().begin().await?;
        let mut written = 0;

        for (key, value) in changes {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            sqlx::query(
                "INSERT INTO settings (key, value) VALUES (?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(key.as_str())
            .bind(value)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tx.commit().await?;
        log::debug!("Updated {} setting(s)", written);
        Ok(written)
    }
}
