//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum::http::StatusCode;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::web::auth::session_id_from_headers;
use crate::web::rest::error_response;
use crate::web::state::{AppState, CurrentUser};

/// Middleware that validates the auth session cookie and resolves the user.
///
/// If valid, inserts a [`CurrentUser`] into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let unauthorized = || error_response(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();

    // 1. Parse session ID from the cookie header
    let Some(auth_session_id) = session_id_from_headers(req.headers()) else {
        return unauthorized();
    };

    // 2. Validate the auth session, get the user id
    let user_id = match state
        .store
        .validate_auth_session(auth_session_id, Utc::now())
        .await
    {
        Ok(user_id) => user_id,
        Err(e) => {
            debug!("Rejected auth session: {}", e);
            return unauthorized();
        }
    };

    // 3. Insert the user into request extensions and continue
    req.extensions_mut().insert(CurrentUser(user_id));
    next.run(req).await
}
