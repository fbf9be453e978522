//! The `sid` cookie that carries the session key.
//!
//! A request without a usable `sid` gets a freshly minted key. Every
//! response re-sends the cookie so its expiry slides forward.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::AppendHeaders;

use helpdesk_types::session::SessionId;

pub const COOKIE_NAME: &str = "sid";

/// Seven days.
pub const COOKIE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Session key resolved from the request.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub id: SessionId,
}

impl SessionCookie {
    /// Header that (re)sets the cookie on the response.
    pub fn set_cookie(&self) -> AppendHeaders<[(HeaderName, HeaderValue); 1]> {
        AppendHeaders([(SET_COOKIE, set_cookie_value(&self.id))])
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match read_session_id(&parts.headers) {
            Some(id) => SessionCookie { id },
            None => {
                let id = SessionId::generate();
                tracing::debug!(session_id = %id, "minted session key");
                SessionCookie { id }
            }
        })
    }
}

/// First valid `sid` value across all `Cookie` headers.
pub fn read_session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == COOKIE_NAME)
        .find_map(|(_, value)| value.trim().trim_matches('"').parse().ok())
}

fn set_cookie_value(id: &SessionId) -> HeaderValue {
    let cookie = format!(
        "{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}"
    );
    // Session keys are printable ASCII without whitespace.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("sid=; Path=/"))
}
