use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Session, User};
use crate::database::Gateway;
use crate::error::ApiError;

/// Errors from the identity provider. These never reach the client from the
/// session resolver, which degrades to anonymous instead.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("malformed session token")]
    MalformedToken,

    #[error(transparent)]
    Upstream(#[from] sqlx::Error),
}

/// The resolved (session, user) pair attached to a request.
#[derive(Debug, Clone)]
pub struct SessionBundle {
    pub session: Session,
    pub user: User,
}

/// Request-scoped identity context: authenticated or anonymous.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Option<SessionBundle>);

impl CurrentIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(bundle: SessionBundle) -> Self {
        Self(Some(bundle))
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(|b| &b.user)
    }

    /// First statement of every mutation handler.
    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Session-lookup capability. One call per request, made by the session
/// resolver middleware; stubbed in tests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<SessionBundle>, IdentityError>;
}

/// Postgres-backed provider: opaque bearer/cookie tokens, hashed at rest,
/// looked up against the sessions table with an expiry check.
pub struct PgIdentityProvider {
    gateway: Gateway,
    cookie_name: String,
}

impl PgIdentityProvider {
    pub fn new(gateway: Gateway, cookie_name: impl Into<String>) -> Self {
        Self {
            gateway,
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn get_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<SessionBundle>, IdentityError> {
        let token = match extract_token(headers, &self.cookie_name) {
            Some(t) => t,
            None => return Ok(None),
        };

        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token_hash, expires_at, created_at
             FROM sessions WHERE token_hash = $1 AND expires_at > now()",
        )
        .bind(hash_token(&token))
        .fetch_optional(self.gateway.pool())
        .await?;

        let session = match session {
            Some(s) => s,
            None => return Ok(None),
        };

        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, username, bio, image, password_hash, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(session.user_id)
        .fetch_optional(self.gateway.pool())
        .await?;

        // A session row without its user is a dangling token; treat as anonymous
        Ok(user.map(|user| SessionBundle { session, user }))
    }
}

/// Extract the opaque session token from Authorization: Bearer or the
/// session cookie. Bearer wins when both are present.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let name = parts.next()?;
        if name == cookie_name {
            let value = parts.next().unwrap_or("");
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Generate a fresh opaque session token. 256 bits from two v4 UUIDs; only
/// the digest is persisted.
pub fn generate_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Insert a session row for the user and return the bearer token to hand to
/// the client. The token itself is never stored.
pub async fn create_session(
    gateway: &Gateway,
    user_id: Uuid,
    expiry_hours: u64,
) -> Result<(String, Session), sqlx::Error> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(expiry_hours as i64);

    let session = sqlx::query_as::<_, Session>(
        "INSERT INTO sessions (user_id, token_hash, expires_at)
         VALUES ($1, $2, $3)
         RETURNING id, user_id, token_hash, expires_at, created_at",
    )
    .bind(user_id)
    .bind(hash_token(&token))
    .bind(expires_at)
    .fetch_one(gateway.pool())
    .await?;

    Ok((token, session))
}

/// Destroy the session matching the presented token. Idempotent: revoking an
/// unknown or already-revoked token is not an error.
pub async fn revoke_session(gateway: &Gateway, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(gateway.pool())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("authorization", "Bearer abc123");
        assert_eq!(extract_token(&headers, "ladle_session").as_deref(), Some("abc123"));
    }

    #[test]
    fn extracts_cookie_token() {
        let headers = headers_with("cookie", "theme=dark; ladle_session=tok456; lang=en");
        assert_eq!(extract_token(&headers, "ladle_session").as_deref(), Some("tok456"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = headers_with("authorization", "Bearer from-header");
        headers.insert("cookie", HeaderValue::from_static("ladle_session=from-cookie"));
        assert_eq!(
            extract_token(&headers, "ladle_session").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn empty_or_missing_token_is_none() {
        assert_eq!(extract_token(&HeaderMap::new(), "ladle_session"), None);
        let headers = headers_with("authorization", "Bearer ");
        assert_eq!(extract_token(&headers, "ladle_session"), None);
        let headers = headers_with("cookie", "ladle_session=");
        assert_eq!(extract_token(&headers, "ladle_session"), None);
    }

    #[test]
    fn tokens_are_unique_and_hashed() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        // Digest is hex-encoded sha256, never the raw token
        let digest = hash_token(&a);
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, a);
    }

    #[test]
    fn require_user_rejects_anonymous() {
        let identity = CurrentIdentity::anonymous();
        let err = identity.require_user().unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
