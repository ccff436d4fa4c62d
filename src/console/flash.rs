//! One-shot flash messages
//!
//! Messages survive exactly one redirect: they are written to the
//! `hpanel_flash` cookie and cleared by the next page that renders them.

use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::hysteria::ApplyOutcome;

/// Flash cookie name
pub const FLASH_COOKIE: &str = "hpanel_flash";

/// Severity, also used as the CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Danger, message)
    }
}

/// Messages describing an apply cycle that did not fully succeed
pub fn apply_flashes(outcome: &ApplyOutcome) -> Vec<Flash> {
    match outcome {
        ApplyOutcome::Applied => Vec::new(),
        ApplyOutcome::WriteFailed(reason) => vec![Flash::danger(format!(
            "Changes saved but NOT applied: the Hysteria configuration could not be written ({})",
            reason
        ))],
        ApplyOutcome::RestartFailed(reason) => vec![Flash::warning(format!(
            "Configuration written but the Hysteria service failed to restart ({})",
            reason
        ))],
    }
}

/// Read the pending messages from a request.
///
/// A missing or undecodable cookie yields no messages.
pub fn take_flashes(headers: &HeaderMap) -> Vec<Flash> {
    read_cookie(headers, FLASH_COOKIE)
        .and_then(|raw| URL_SAFE_NO_PAD.decode(raw).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// `Set-Cookie` value carrying `flashes`
pub fn flash_cookie(flashes: &[Flash]) -> Option<HeaderValue> {
    let json = serde_json::to_vec(flashes).ok()?;
    let value = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE,
        URL_SAFE_NO_PAD.encode(json)
    );
    HeaderValue::from_str(&value).ok()
}

/// `Set-Cookie` value removing the flash cookie
pub fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("hpanel_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// 303 redirect that carries flash messages and optional extra cookies
pub struct FlashRedirect {
    location: String,
    flashes: Vec<Flash>,
    cookies: Vec<HeaderValue>,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flashes: Vec::new(),
            cookies: Vec::new(),
        }
    }

    pub fn flash(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }

    pub fn flashes(mut self, flashes: impl IntoIterator<Item = Flash>) -> Self {
        self.flashes.extend(flashes);
        self
    }

    pub fn cookie(mut self, cookie: HeaderValue) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = StatusCode::SEE_OTHER.into_response();
        let headers = response.headers_mut();

        match HeaderValue::from_str(&self.location) {
            Ok(location) => {
                headers.insert(LOCATION, location);
            }
            Err(_) => {
                headers.insert(LOCATION, HeaderValue::from_static("/"));
            }
        }

        if !self.flashes.is_empty() {
            if let Some(cookie) = flash_cookie(&self.flashes) {
                headers.append(SET_COOKIE, cookie);
            }
        }
        for cookie in self.cookies {
            headers.append(SET_COOKIE, cookie);
        }

        response
    }
}

/// Value of cookie `name` from the request's `Cookie` headers
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_read_cookie() {
        let headers = request_headers("a=1; hpanel_session=abc.def; b=2");
        assert_eq!(read_cookie(&headers, "hpanel_session"), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "b"), Some("2"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_flash_cookie_is_read_back() {
        let flashes = vec![Flash::success("User alice added"), Flash::danger("<b>bad</b>")];
        let cookie = flash_cookie(&flashes).unwrap();
        let pair = cookie.to_str().unwrap().split(';').next().unwrap().to_string();

        assert_eq!(take_flashes(&request_headers(&pair)), flashes);
    }

    #[test]
    fn test_garbage_flash_cookie_is_ignored() {
        assert!(take_flashes(&request_headers("hpanel_flash=%%%")).is_empty());
        assert!(take_flashes(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_apply_flashes() {
        assert!(apply_flashes(&ApplyOutcome::Applied).is_empty());

        let write = apply_flashes(&ApplyOutcome::WriteFailed("permission denied".to_string()));
        assert_eq!(write[0].level, FlashLevel::Danger);
        assert!(write[0].message.contains("NOT applied"));

        let restart = apply_flashes(&ApplyOutcome::RestartFailed("exit 1".to_string()));
        assert_eq!(restart[0].level, FlashLevel::Warning);
    }

    #[test]
    fn test_redirect_sets_location_and_cookie() {
        let response = FlashRedirect::to("/hysteria/users")
            .flash(Flash::success("done"))
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/hysteria/users");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("hpanel_flash="));
    }
}
