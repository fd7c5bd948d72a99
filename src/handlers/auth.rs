// Email/password authentication against the users and sessions tables.
// Tokens are returned in the body for API clients and set as an HttpOnly
// cookie for browser clients; only their digest is persisted.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config;
use crate::database::models::User;
use crate::error::ApiError;
use crate::identity::{self, CurrentIdentity};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub bio: Option<String>,
}

impl SignUpRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation_field("name", "must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(ApiError::validation_field("email", "must be a valid email address"));
        }
        if self.password.len() < 8 {
            return Err(ApiError::validation_field(
                "password",
                "must be at least 8 characters",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub user: User,
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        config::config().auth.session_cookie,
        token,
        max_age_secs
    )
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            ApiError::internal_server_error("Failed to create account")
        })?
        .to_string();

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, username, bio, password_hash)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, email, username, bio, image, password_hash, created_at, updated_at",
    )
    .bind(payload.name.trim())
    .bind(payload.email.to_lowercase())
    .bind(&payload.username)
    .bind(&payload.bio)
    .bind(&password_hash)
    .fetch_one(state.gateway.pool())
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::conflict("An account with this email already exists")
        }
        _ => ApiError::from(e),
    })?;

    let expiry_hours = config::config().auth.session_expiry_hours;
    let (token, _session) = identity::create_session(&state.gateway, user.id, expiry_hours).await?;

    let cookie = session_cookie(&token, (expiry_hours * 3600) as i64);
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::created(AuthData { token, user }),
    ))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, username, bio, image, password_hash, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(payload.email.to_lowercase())
    .fetch_optional(state.gateway.pool())
    .await?
    // Unknown email and wrong password are indistinguishable to the caller
    .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        tracing::error!("Stored password hash is unparseable: {}", e);
        ApiError::internal_server_error("Authentication error")
    })?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::unauthorized("Invalid email or password"))?;

    let expiry_hours = config::config().auth.session_expiry_hours;
    let (token, _session) = identity::create_session(&state.gateway, user.id, expiry_hours).await?;

    let cookie = session_cookie(&token, (expiry_hours * 3600) as i64);
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(AuthData { token, user }),
    ))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let cookie_name = &config::config().auth.session_cookie;
    if let Some(token) = identity::extract_token(&headers, cookie_name) {
        identity::revoke_session(&state.gateway, &token).await?;
    }

    // Clear the cookie whether or not a session existed
    let cookie = session_cookie("", 0);
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "signed_out": true })),
    ))
}

/// GET /api/auth/whoami
pub async fn whoami(Extension(identity): Extension<CurrentIdentity>) -> ApiResult<User> {
    let user = identity.require_user()?;
    Ok(ApiResponse::success(user.clone()))
}
