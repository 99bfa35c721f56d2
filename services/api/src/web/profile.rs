//! services/api/src/web/profile.rs
//!
//! Handlers for the signed-in user's own records: profile, theme and
//! favourite locations.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use ride_share_core::domain::Theme;
use ride_share_core::ports::PortError;
use std::sync::Arc;

use crate::web::dto::{
    CreateLocationRequest, FavoriteLocationResponse, ProfileUpdateRequest, ThemeRequest,
    UserResponse,
};
use crate::web::rest::{bad_request, json_rejection, port_failure, ErrorBody, HandlerError};
use crate::web::state::{AppState, CurrentUser};

/// GET /api/user - The authenticated user
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "The current user", body = UserResponse),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn current_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, HandlerError> {
    let user = state
        .store
        .get_user(user_id)
        .await
        .and_then(|user| {
            user.ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
        })
        .map_err(port_failure("Failed to load user"))?;
    Ok(Json(user.into()))
}

/// PATCH /api/profile - Update name, phone or profile image
#[utoipa::path(
    patch,
    path = "/api/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorBody)
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let user = state
        .store
        .update_user_profile(user_id, req.into())
        .await
        .map_err(port_failure("Failed to update profile"))?;
    Ok(Json(user.into()))
}

/// PATCH /api/profile/theme - Switch between light and dark
#[utoipa::path(
    patch,
    path = "/api/profile/theme",
    request_body = ThemeRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Unknown theme", body = ErrorBody)
    )
)]
pub async fn update_theme_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<ThemeRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let theme = req.theme.parse::<Theme>().map_err(bad_request)?;
    let user = state
        .store
        .update_user_theme(user_id, theme)
        .await
        .map_err(port_failure("Failed to update theme"))?;
    Ok(Json(user.into()))
}

/// POST /api/locations - Save a favourite location
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location saved", body = FavoriteLocationResponse),
        (status = 400, description = "Invalid request", body = ErrorBody)
    )
)]
pub async fn create_location_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<CreateLocationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let location = req.validate().map_err(bad_request)?;
    let location = state
        .store
        .create_favorite_location(user_id, location)
        .await
        .map_err(port_failure("Failed to save location"))?;
    Ok((
        StatusCode::CREATED,
        Json(FavoriteLocationResponse::from(location)),
    ))
}

/// GET /api/locations - The caller's favourite locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "Saved locations", body = [FavoriteLocationResponse])
    )
)]
pub async fn list_locations_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<FavoriteLocationResponse>>, HandlerError> {
    let locations = state
        .store
        .list_favorite_locations(user_id)
        .await
        .map_err(port_failure("Failed to load locations"))?;
    Ok(Json(locations.into_iter().map(Into::into).collect()))
}
