//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration, login, and logout.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use ride_share_core::domain::{AuthSession, EntityId, NewUser, Theme};
use ride_share_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::web::dto::{LoginRequest, RegisterRequest, UserResponse};
use crate::web::rest::{
    bad_request, error_response, json_rejection, port_failure, ErrorBody, HandlerError,
};
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

//=========================================================================================
// Cookie Helpers
//=========================================================================================

/// Pulls the session id out of a `Cookie` request header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

fn session_cookie(value: &str, max_age_seconds: i64, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        value,
        if secure { " Secure;" } else { "" },
        max_age_seconds
    )
}

/// Creates an auth session for `user_id` and returns the `Set-Cookie` value.
async fn start_session(state: &AppState, user_id: EntityId) -> Result<String, HandlerError> {
    let ttl = Duration::days(state.config.session_ttl_days);
    let session = AuthSession {
        id: Uuid::new_v4().to_string(),
        user_id,
        expires_at: Utc::now() + ttl,
    };
    let cookie = session_cookie(&session.id, ttl.num_seconds(), state.config.cookie_secure);

    state
        .store
        .create_auth_session(session)
        .await
        .map_err(port_failure("Failed to create session"))?;
    Ok(cookie)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/register - Create a new user account and log it in
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Username already taken", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    req.validate().map_err(bad_request)?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        })?
        .to_string();

    // 2. Create the user
    let user = state
        .store
        .create_user(NewUser {
            username: req.username.trim().to_string(),
            hashed_password: password_hash,
            name: req.name,
            phone: req.phone,
            theme: Theme::default(),
            profile_image: None,
        })
        .await
        .map_err(port_failure("Failed to create user"))?;
    info!(user_id = user.id, "User registered");

    // 3. Log the new user in
    let cookie = start_session(&state, user.id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /api/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let invalid = || error_response(StatusCode::UNAUTHORIZED, "Invalid username or password");

    // 1. Get the stored credentials
    let creds = match state.store.get_credentials_by_username(req.username.trim()).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(invalid()),
        Err(e) => return Err(port_failure("Failed to load user")(e)),
    };

    // 2. Verify the password
    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    // 3. Load the profile and start a session
    let user = state
        .store
        .get_user(creds.user_id)
        .await
        .map_err(port_failure("Failed to load user"))?
        .ok_or_else(invalid)?;
    let cookie = start_session(&state, user.id).await?;
    info!(user_id = user.id, "User logged in");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /api/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "No session found"))?;

    state
        .store
        .delete_auth_session(auth_session_id)
        .await
        .map_err(port_failure("Failed to logout"))?;

    let cookie = session_cookie("", 0, state.config.cookie_secure);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_id_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; other=1"),
        );
        assert_eq!(session_id_from_headers(&headers), Some("abc-123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn secure_flag_follows_configuration() {
        assert!(session_cookie("x", 60, true).contains("Secure"));
        let plain = session_cookie("x", 60, false);
        assert!(!plain.contains("Secure"));
        assert!(plain.starts_with("session=x; HttpOnly;"));
    }
}
