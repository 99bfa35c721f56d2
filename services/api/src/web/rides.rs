//! services/api/src/web/rides.rs
//!
//! Handlers for posting and browsing ride offers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::web::dto::{CreateRideRequest, RideResponse};
use crate::web::rest::{bad_request, json_rejection, port_failure, ErrorBody, HandlerError};
use crate::web::state::{AppState, CurrentUser};

/// POST /api/rides - Offer a ride as the current user
#[utoipa::path(
    post,
    path = "/api/rides",
    request_body = CreateRideRequest,
    responses(
        (status = 201, description = "Ride created", body = RideResponse),
        (status = 400, description = "Invalid ride", body = ErrorBody),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn create_ride_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(driver_id)): Extension<CurrentUser>,
    payload: Result<Json<CreateRideRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let new_ride = req.validate().map_err(bad_request)?;
    let ride = state
        .rides
        .create_ride(driver_id, new_ride)
        .await
        .map_err(port_failure("Failed to create ride"))?;
    Ok((StatusCode::CREATED, Json(RideResponse::from(ride))))
}

/// GET /api/rides - Rides that can still be booked
#[utoipa::path(
    get,
    path = "/api/rides",
    responses(
        (status = 200, description = "Available, unexpired rides", body = [RideResponse]),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn list_rides_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RideResponse>>, HandlerError> {
    let rides = state
        .rides
        .list_available_rides(Utc::now())
        .await
        .map_err(port_failure("Failed to load rides"))?;
    Ok(Json(rides.into_iter().map(Into::into).collect()))
}
