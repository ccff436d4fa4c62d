//! Shared console state

use std::sync::Arc;

use crate::hysteria::ApplyController;
use crate::netinfo::PublicIpResolver;
use crate::service::ServiceManager;
use crate::store::Store;

use super::auth::SessionKey;

/// Everything a handler needs, passed explicitly to the router
#[derive(Clone)]
pub struct ConsoleState {
    pub store: Store,
    pub apply: ApplyController,
    pub session_key: SessionKey,
    pub resolver: PublicIpResolver,
    /// Journal lines shown on the logs page
    pub log_lines: usize,
    base_path: Arc<str>,
}

impl ConsoleState {
    /// State with a freshly generated session key.
    ///
    /// `base_path` must already be normalized (see [`normalize_base_path`]).
    pub fn new(
        store: Store,
        apply: ApplyController,
        resolver: PublicIpResolver,
        log_lines: usize,
        base_path: &str,
    ) -> Self {
        Self {
            store,
            apply,
            session_key: SessionKey::generate(),
            resolver,
            log_lines,
            base_path: Arc::from(base_path),
        }
    }

    pub fn with_session_key(mut self, session_key: SessionKey) -> Self {
        self.session_key = session_key;
        self
    }

    /// Path prefix, empty when mounted at the root
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Absolute URL path of a console route
    pub fn url(&self, path: &str) -> String {
        match (self.base_path.is_empty(), path) {
            (true, _) => path.to_string(),
            (false, "/") => self.base_path.to_string(),
            (false, _) => format!("{}{}", self.base_path, path),
        }
    }

    pub fn service(&self) -> &Arc<dyn ServiceManager> {
        self.apply.service()
    }
}

/// Turn the `panel_path` setting into a route prefix.
///
/// `""` and `"/"` mount the console at the root. Returns `None` for values that
/// cannot be used as a literal path prefix.
pub fn normalize_base_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Some(String::new());
    }

    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));
    if !valid || trimmed.contains("//") {
        return None;
    }

    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{}", trimmed))
    }
}
