//! Signed client-side session cookie.
//!
//! The cookie carries the logged-in username and the flash messages queued for
//! the next rendered page, nothing else. Its value is
//! `base64url(json) "." base64url(HMAC-SHA256(key, json))`: integrity protected,
//! not encrypted. A cookie whose tag does not verify is treated as no session.

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
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, error, warn};

pub const SESSION_COOKIE_NAME: &str = "frontdesk_session";

const MIN_KEY_LEN: usize = 32;
const GENERATED_KEY_LEN: usize = 64;
/// Flashes kept in the cookie; older ones are dropped to bound its size.
const MAX_FLASHES: usize = 4;

type HmacSha256 = Hmac<Sha256>;

/// Severity of a flash message, also used as its CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<Flash>,
}

impl SessionState {
    fn is_empty(&self) -> bool {
        self.user.is_none() && self.flashes.is_empty()
    }
}

/// Signing key and cookie attributes, shared by every request.
pub struct SessionConfig {
    key: SecretSlice<u8>,
    secure: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn new(key: Vec<u8>) -> Self {
        Self {
            key: SecretSlice::from(key),
            secure: false,
        }
    }

    /// Build the config from `SECRET_KEY`, generating a per-process key when
    /// none is configured.
    #[must_use]
    pub fn from_secret(secret: Option<&SecretString>) -> Self {
        match secret.map(|s| s.expose_secret().as_bytes().to_vec()) {
            Some(key) if !key.is_empty() => {
                if key.len() < MIN_KEY_LEN {
                    warn!(
                        "SECRET_KEY is shorter than {MIN_KEY_LEN} bytes, use a longer random value"
                    );
                }
                Self::new(key)
            }
            _ => {
                warn!("SECRET_KEY not set, sessions will not survive a restart");
                let mut key = vec![0u8; GENERATED_KEY_LEN];
                OsRng.fill_bytes(&mut key);
                Self::new(key)
            }
        }
    }

    /// Mark the cookie `Secure` (only sent over HTTPS).
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(self.key.expose_secret()).ok()
    }

    fn encode(&self, state: &SessionState) -> Option<String> {
        let payload = serde_json::to_vec(state)
            .map_err(|e| error!("Failed to serialize session: {e}"))
            .ok()?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();

        Some(format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(&payload),
            Base64UrlUnpadded::encode_string(&tag)
        ))
    }

    fn decode(&self, value: &str) -> Option<SessionState> {
        let (payload, tag) = value.split_once('.')?;
        let payload = Base64UrlUnpadded::decode_vec(payload).ok()?;
        let tag = Base64UrlUnpadded::decode_vec(tag).ok()?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        // constant-time comparison
        mac.verify_slice(&tag).ok()?;

        serde_json::from_slice(&payload).ok()
    }

    fn cookie(&self, value: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("key", &"***")
            .field("secure", &self.secure)
            .finish()
    }
}

/// Per-request view of the session. Extract it in a handler, mutate it, and
/// return it as part of the response so the cookie is rewritten.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    config: Arc<SessionConfig>,
    dirty: bool,
}

impl Session {
    fn from_headers(headers: &HeaderMap, config: Arc<SessionConfig>) -> Self {
        let Some(raw) = cookie_value(headers) else {
            return Self {
                state: SessionState::default(),
                config,
                dirty: false,
            };
        };

        match config.decode(&raw) {
            Some(state) => Self {
                state,
                config,
                dirty: false,
            },
            None => {
                debug!("Discarding session cookie that failed verification");
                Self {
                    state: SessionState::default(),
                    config,
                    dirty: true,
                }
            }
        }
    }

    /// Record `username` as the authenticated identity.
    pub fn login(&mut self, username: impl Into<String>) {
        self.state.user = Some(username.into());
        self.dirty = true;
    }

    /// Forget everything, identity and pending flashes. Safe to repeat.
    pub fn logout(&mut self) {
        self.state = SessionState::default();
        self.dirty = true;
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        self.state.user.as_deref()
    }

    /// Queue a message for the next rendered page, keeping only the most
    /// recent [`MAX_FLASHES`].
    pub fn flash(&mut self, level: Level, text: impl Into<String>) {
        self.state.flashes.push(Flash {
            level,
            text: text.into(),
        });
        let excess = self.state.flashes.len().saturating_sub(MAX_FLASHES);
        self.state.flashes.drain(..excess);
        self.dirty = true;
    }

    /// Drain queued messages for display.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.state.flashes.is_empty() {
            return Vec::new();
        }
        self.dirty = true;
        std::mem::take(&mut self.state.flashes)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<Arc<SessionConfig>>()
            .cloned()
            .ok_or_else(|| {
                error!("Session config extension is missing");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable")
            })?;

        Ok(Self::from_headers(&parts.headers, config))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.dirty {
            return Ok(res);
        }

        let cookie = if self.state.is_empty() {
            self.config.clear_cookie()
        } else {
            match self.config.encode(&self.state) {
                Some(value) => self.config.cookie(&value),
                None => self.config.clear_cookie(),
            }
        };

        match cookie {
            Ok(cookie) => {
                res.headers_mut().append(SET_COOKIE, cookie);
            }
            Err(e) => error!("Failed to build session cookie: {e}"),
        }

        Ok(res)
    }
}

fn cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .find(|val| !val.is_empty())
}
