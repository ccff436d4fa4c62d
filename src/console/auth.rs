//! Session authentication
//!
//! A session is a cookie holding `<admin id>.<issued at>.<hmac>`, signed with
//! HMAC-SHA256 under a key generated when the process starts. Restarting the
//! console therefore logs everybody out.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::error::{ConsoleError, ConsoleResult};
use super::flash::read_cookie;
use super::state::ConsoleState;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "hpanel_session";

/// Seconds a session stays valid after login
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Per-process session signing key
#[derive(Clone)]
pub struct SessionKey {
    secret: Arc<[u8; 32]>,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl SessionKey {
    /// Fresh random key
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_bytes(secret)
    }

    pub fn from_bytes(secret: [u8; 32]) -> Self {
        Self { secret: Arc::new(secret) }
    }

    fn mac(&self, payload: &str) -> ConsoleResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_slice())
            .map_err(|e| ConsoleError::Session(e.to_string()))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    /// Token for `admin_id` issued at `issued_at` (unix seconds)
    pub fn sign(&self, admin_id: i64, issued_at: i64) -> ConsoleResult<String> {
        let payload = format!("{}.{}", admin_id, issued_at);
        let tag = self.mac(&payload)?.finalize().into_bytes();
        Ok(format!("{}.{}", payload, hex::encode(tag)))
    }

    /// Admin id carried by `token`, if the signature holds and it has not expired
    pub fn verify(&self, token: &str, now: i64) -> Option<i64> {
        let (payload, tag) = token.rsplit_once('.')?;
        let (admin_id, issued_at) = payload.split_once('.')?;
        let admin_id: i64 = admin_id.parse().ok()?;
        let issued_at: i64 = issued_at.parse().ok()?;

        let tag = hex::decode(tag).ok()?;
        self.mac(payload).ok()?.verify_slice(&tag).ok()?;

        if now < issued_at || now - issued_at > SESSION_TTL_SECS {
            return None;
        }

        Some(admin_id)
    }

    /// `Set-Cookie` value starting a session for `admin_id`
    pub fn session_cookie(&self, admin_id: i64) -> ConsoleResult<HeaderValue> {
        let token = self.sign(admin_id, Utc::now().timestamp())?;
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token
        ))
        .map_err(|e| ConsoleError::Session(e.to_string()))
    }
}

/// `Set-Cookie` value ending the session
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("hpanel_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Administrator behind the current request
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: i64,
    pub username: String,
}

/// Gate in front of every protected route.
///
/// Requests without a valid session, or whose administrator no longer exists,
/// are redirected to the login page.
pub async fn require_session(
    State(state): State<ConsoleState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ConsoleError> {
    let admin_id = read_cookie(req.headers(), SESSION_COOKIE)
        .and_then(|token| state.session_key.verify(token, Utc::now().timestamp()));

    let admin = match admin_id {
        Some(id) => state.store.find_admin(id).await?,
        None => None,
    };

    let Some(admin) = admin else {
        log::debug!("Unauthenticated request to {}", req.uri().path());
        return Ok(Redirect::to(&state.url("/login")).into_response());
    };

    req.extensions_mut().insert(AdminSession {
        id: admin.id,
        username: admin.username,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SessionKey {
        SessionKey::from_bytes([7u8; 32])
    }

    #[test]
    fn test_sign_and_verify() {
        let now = 1_700_000_000;
        let token = key().sign(1, now).unwrap();
        assert_eq!(key().verify(&token, now + 60), Some(1));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let now = 1_700_000_000;
        let token = key().sign(1, now).unwrap();

        let forged = token.replacen("1.", "2.", 1);
        assert_eq!(key().verify(&forged, now), None);

        let other = SessionKey::from_bytes([8u8; 32]);
        assert_eq!(other.verify(&token, now), None);

        assert_eq!(key().verify("garbage", now), None);
        assert_eq!(key().verify("1.2.zz", now), None);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = 1_700_000_000;
        let token = key().sign(1, now).unwrap();
        assert_eq!(key().verify(&token, now + SESSION_TTL_SECS + 1), None);
        assert_eq!(key().verify(&token, now - 10), None);
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = SessionKey::generate();
        let b = SessionKey::generate();
        let token = a.sign(1, 0).unwrap();
        assert_eq!(b.verify(&token, 0), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = key().session_cookie(3).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("hpanel_session=3."));
        assert!(cookie.contains("HttpOnly"));
    }
}
