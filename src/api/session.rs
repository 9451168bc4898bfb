//! Signed client-side sessions.
//!
//! The cookie value is `base64url(payload) "." base64url(tag)` where the
//! payload is JSON `{identifier, role, exp}` and the tag is `HMAC-SHA256` of
//! the encoded payload under the configured secret. Anything that fails to
//! verify, fails to parse, or is past `exp` reads as an anonymous session.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponseParts, ResponseParts},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{convert::Infallible, fmt, sync::Arc};
use tracing::error;

pub const SESSION_COOKIE_NAME: &str = "axis_session";

/// Signing secret used when none is configured. Only fit for local development.
pub const DEV_SECRET: &str = "dev-secret-key-please-change";

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

/// The authenticated actor carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub identifier: String,
    pub role: String,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    #[serde(flatten)]
    user: SessionUser,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionConfig {
    secret: SecretString,
    ttl_seconds: i64,
    cookie_secure: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()).ok()
    }

    /// Produce a signed cookie value for `user`, valid until `now + ttl`.
    pub(crate) fn encode(&self, user: &SessionUser, now: i64) -> Option<String> {
        let payload = Payload {
            user: user.clone(),
            exp: now.saturating_add(self.ttl_seconds),
        };
        let json = serde_json::to_vec(&payload).ok()?;
        let body = Base64UrlUnpadded::encode_string(&json);

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let tag = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Some(format!("{body}.{tag}"))
    }

    /// Verify a cookie value and return its user if it is still valid at `now`.
    pub(crate) fn decode(&self, value: &str, now: i64) -> Option<SessionUser> {
        let (body, tag) = value.split_once('.')?;
        let tag = Base64UrlUnpadded::decode_vec(tag).ok()?;

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        mac.verify_slice(&tag).ok()?;

        let json = Base64UrlUnpadded::decode_vec(body).ok()?;
        let payload: Payload = serde_json::from_slice(&json).ok()?;
        (payload.exp > now).then_some(payload.user)
    }

    fn session_cookie(&self, user: &SessionUser) -> Option<HeaderValue> {
        let value = self.encode(user, Utc::now().timestamp())?;
        self.cookie(&value, self.ttl_seconds).ok()
    }

    fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Per-request session, resolved from the cookie before the handler runs.
///
/// Handlers that change the session must return it as part of the response
/// so the new cookie is written.
#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<SessionConfig>,
    user: Option<SessionUser>,
    changed: bool,
}

impl Session {
    #[must_use]
    pub fn new(config: Arc<SessionConfig>) -> Self {
        Self {
            config,
            user: None,
            changed: false,
        }
    }

    pub fn start(&mut self, identifier: impl Into<String>, role: impl Into<String>) {
        self.user = Some(SessionUser {
            identifier: identifier.into(),
            role: role.into(),
        });
        self.changed = true;
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.changed = true;
    }

    #[must_use]
    pub fn current(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    fn from_headers(config: Arc<SessionConfig>, headers: &HeaderMap) -> Self {
        let user = extract_session_cookie(headers)
            .and_then(|value| config.decode(&value, Utc::now().timestamp()));
        Self {
            config,
            user,
            changed: false,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(config) = parts.extensions.get::<Arc<SessionConfig>>().cloned() else {
            error!("Session config missing from request extensions");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };
        Ok(Self::from_headers(config, &parts.headers))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.changed {
            return Ok(res);
        }

        let cookie = match &self.user {
            Some(user) => self.config.session_cookie(user),
            None => self.config.clear_cookie().ok(),
        };

        match cookie {
            Some(cookie) => {
                res.headers_mut().append(SET_COOKIE, cookie);
            }
            None => error!("Failed to build session cookie"),
        }

        Ok(res)
    }
}

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn config() -> Arc<SessionConfig> {
        Arc::new(
            SessionConfig::new(SecretString::from("test-secret".to_string())).with_ttl_seconds(60),
        )
    }

    fn user() -> SessionUser {
        SessionUser {
            identifier: "a@x.com".to_string(),
            role: "driver".to_string(),
        }
    }

    fn set_cookie(session: Session) -> Option<String> {
        let response = (session, "ok").into_response();
        response
            .headers()
            .get(SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string())
    }

    fn cookie_value(set_cookie: &str) -> String {
        let first = set_cookie.split(';').next().unwrap();
        first
            .strip_prefix(&format!("{SESSION_COOKIE_NAME}="))
            .unwrap()
            .to_string()
    }

    #[test]
    fn encode_decode_round_trip() {
        let config = config();
        let value = config.encode(&user(), 1_000).unwrap();
        assert_eq!(config.decode(&value, 1_000), Some(user()));
    }

    #[test]
    fn decode_rejects_expired() {
        let config = config();
        let value = config.encode(&user(), 1_000).unwrap();
        assert_eq!(config.decode(&value, 1_059), Some(user()));
        assert_eq!(config.decode(&value, 1_060), None);
    }

    #[test]
    fn decode_rejects_tampered_payload() {
        let config = config();
        let value = config.encode(&user(), 1_000).unwrap();
        let (_, tag) = value.split_once('.').unwrap();

        let forged = Payload {
            user: SessionUser {
                identifier: "a@x.com".to_string(),
                role: "admin".to_string(),
            },
            exp: 5_000,
        };
        let body = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&forged).unwrap());

        assert_eq!(config.decode(&format!("{body}.{tag}"), 1_000), None);
    }

    #[test]
    fn decode_rejects_other_secret() {
        let value = config().encode(&user(), 1_000).unwrap();
        let other = SessionConfig::new(SecretString::from("another-secret".to_string()));
        assert_eq!(other.decode(&value, 1_000), None);
    }

    #[test]
    fn decode_rejects_garbage() {
        let config = config();
        assert_eq!(config.decode("", 0), None);
        assert_eq!(config.decode("no-dot", 0), None);
        assert_eq!(config.decode("a.b.c", 0), None);
        assert_eq!(config.decode("!!!.???", 0), None);
    }

    #[test]
    fn start_then_current() {
        let mut session = Session::new(config());
        assert!(session.current().is_none());

        session.start("a@x.com", "driver");

        assert_eq!(session.current(), Some(&user()));
    }

    #[test]
    fn clear_makes_session_anonymous() {
        let mut session = Session::new(config());
        session.start("a@x.com", "driver");
        session.clear();
        assert!(session.current().is_none());

        let mut fresh = Session::new(config());
        fresh.clear();
        assert!(fresh.current().is_none());
    }

    #[test]
    fn unchanged_session_writes_no_cookie() {
        assert!(set_cookie(Session::new(config())).is_none());
    }

    #[test]
    fn started_session_writes_signed_cookie() {
        let config = config();
        let mut session = Session::new(config.clone());
        session.start("a@x.com", "driver");

        let header = set_cookie(session).unwrap();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Max-Age=60"));
        assert!(!header.contains("Secure"));

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("theme=dark; {SESSION_COOKIE_NAME}={}", cookie_value(&header))
                .parse()
                .unwrap(),
        );
        let resolved = Session::from_headers(config, &headers);
        assert_eq!(resolved.current(), Some(&user()));
    }

    #[test]
    fn cleared_session_expires_cookie() {
        let config = Arc::new(
            SessionConfig::new(SecretString::from("s".to_string())).with_cookie_secure(true),
        );
        let mut session = Session::new(config);
        session.clear();

        let header = set_cookie(session).unwrap();
        assert!(header.starts_with(&format!("{SESSION_COOKIE_NAME}=;")));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Secure"));
    }

    #[test]
    fn missing_or_foreign_cookie_is_anonymous() {
        let mut headers = HeaderMap::new();
        assert!(Session::from_headers(config(), &headers).current().is_none());

        headers.insert(COOKIE, "other=value".parse().unwrap());
        assert!(Session::from_headers(config(), &headers).current().is_none());

        headers.insert(COOKIE, format!("{SESSION_COOKIE_NAME}=").parse().unwrap());
        assert!(Session::from_headers(config(), &headers).current().is_none());
    }
}
