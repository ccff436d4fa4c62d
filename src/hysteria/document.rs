//! Hysteria v2 server configuration document
//!
//! The document is rebuilt in full from the settings table and the active
//! users on every apply. Only `listen`, `tls` and `auth.password` depend on
//! stored state; every other block is a fixed literal.

use serde::{Serialize, Serializer};

use crate::store::{SettingKey, Settings, VpnUser};

/// Password emitted when no user is active
pub const AUTH_PLACEHOLDER: &str = "changeme";

/// Masquerade target for non-Hysteria probes
pub const MASQUERADE_URL: &str = "https://www.bing.com";

/// Fixed server-wide bandwidth
pub const BANDWIDTH: &str = "1 gbps";

/// The `auth.password` field
///
/// The server accepts either a scalar or a sequence here, and which one is
/// emitted depends on how many users are active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPassword {
    /// Exactly one active user: a plain string
    Single(String),
    /// More than one active user: a sequence in query order
    List(Vec<String>),
    /// No active user: [`AUTH_PLACEHOLDER`]
    Placeholder,
}

impl AuthPassword {
    /// Pick the variant for a list of auth strings.
    pub fn from_auth_strings(mut auth: Vec<String>) -> Self {
        match auth.len() {
            0 => AuthPassword::Placeholder,
            1 => AuthPassword::Single(auth.remove(0)),
            _ => AuthPassword::List(auth),
        }
    }
}

impl Serialize for AuthPassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AuthPassword::Single(password) => serializer.serialize_str(password),
            AuthPassword::List(passwords) => passwords.serialize(serializer),
            AuthPassword::Placeholder => serializer.serialize_str(AUTH_PLACEHOLDER),
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HysteriaConfig {
    pub listen: String,
    pub tls: TlsSection,
    pub auth: AuthSection,
    pub masquerade: MasqueradeSection,
    pub quic: QuicSection,
    pub bandwidth: BandwidthSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsSection {
    pub cert: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub password: AuthPassword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasqueradeSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub proxy: MasqueradeProxy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasqueradeProxy {
    pub url: String,
    pub rewrite_host: bool,
}

/// QUIC transport tuning, identical on every render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuicSection {
    pub init_stream_receive_window: u64,
    pub max_stream_receive_window: u64,
    pub init_conn_receive_window: u64,
    pub max_conn_receive_window: u64,
    pub max_idle_timeout: String,
    pub max_incoming_streams: u32,
    #[serde(rename = "disablePathMTUDiscovery")]
    pub disable_path_mtu_discovery: bool,
}

impl Default for QuicSection {
    fn default() -> Self {
        Self {
            init_stream_receive_window: 16_777_216,
            max_stream_receive_window: 16_777_216,
            init_conn_receive_window: 33_554_432,
            max_conn_receive_window: 33_554_432,
            max_idle_timeout: "30s".to_string(),
            max_incoming_streams: 1024,
            disable_path_mtu_discovery: false,
        }
    }
}

/// Server-wide bandwidth
///
/// Per-user `upload_mbps`/`download_mbps` are stored but not rendered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandwidthSection {
    pub up: String,
    pub down: String,
}

impl Default for BandwidthSection {
    fn default() -> Self {
        Self {
            up: BANDWIDTH.to_string(),
            down: BANDWIDTH.to_string(),
        }
    }
}

/// Build the configuration document.
///
/// Pure: the same settings and users always give the same document. Users
/// whose active flag is cleared are skipped, so callers may pass the whole
/// table.
pub fn synthesize(settings: &Settings, users: &[VpnUser]) -> HysteriaConfig {
    let auth = users
        .iter()
        .filter(|user| user.is_active)
        .map(|user| user.password.clone())
        .collect();

    HysteriaConfig {
        listen: format!(":{}", settings.get(SettingKey::ServerPort)),
        tls: TlsSection {
            cert: settings.get(SettingKey::CertPath).to_string(),
            key: settings.get(SettingKey::KeyPath).to_string(),
        },
        auth: AuthSection {
            kind: "password".to_string(),
            password: AuthPassword::from_auth_strings(auth),
        },
        masquerade: MasqueradeSection {
            kind: "proxy".to_string(),
            proxy: MasqueradeProxy {
                url: MASQUERADE_URL.to_string(),
                rewrite_host: true,
            },
        },
        quic: QuicSection::default(),
        bandwidth: BandwidthSection::default(),
    }
}

impl HysteriaConfig {
    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
