//! services/api/src/web/bookings.rs
//!
//! Handlers for requesting seats, deciding on requests and the booking history.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use ride_share_core::domain::{BookingDecision, EntityId};
use std::sync::Arc;
use tracing::warn;

use crate::web::dto::{
    BookingHistoryResponse, BookingResponse, CreateBookingRequest, UpdateBookingStatusRequest,
};
use crate::web::rest::{
    bad_request, error_response, json_rejection, port_failure, ErrorBody, HandlerError,
};
use crate::web::state::{AppState, CurrentUser};

/// POST /api/bookings - Request a seat on a ride
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created in pending state", body = BookingResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Ride not found", body = ErrorBody)
    )
)]
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(rider_id)): Extension<CurrentUser>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let booking = state
        .bookings
        .create_booking(rider_id, req.ride_id, req.is_parcel)
        .await
        .map_err(port_failure("Failed to create booking"))?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

/// PATCH /api/bookings/{id}/status - Accept or reject a booking on one of your rides
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    request_body = UpdateBookingStatusRequest,
    params(
        ("id" = i64, Path, description = "Booking id")
    ),
    responses(
        (status = 200, description = "Updated booking", body = BookingResponse),
        (status = 400, description = "Status is not accepted or rejected", body = ErrorBody),
        (status = 403, description = "Caller does not drive this ride", body = ErrorBody),
        (status = 404, description = "Booking not found", body = ErrorBody)
    )
)]
pub async fn update_booking_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(booking_id): Path<EntityId>,
    payload: Result<Json<UpdateBookingStatusRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, HandlerError> {
    let Json(req) = payload.map_err(json_rejection)?;
    let decision = req.status.parse::<BookingDecision>().map_err(bad_request)?;

    // Only the driver of the booked ride may decide on it.
    let booking = state
        .store
        .get_booking(booking_id)
        .await
        .map_err(port_failure("Failed to load booking"))?
        .ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                format!("Booking {} not found", booking_id),
            )
        })?;
    let driver_id = state
        .rides
        .get_ride(booking.ride_id)
        .await
        .map_err(port_failure("Failed to load ride"))?
        .map(|ride| ride.driver_id);
    if driver_id != Some(user_id) {
        warn!(booking_id, user_id, "Booking decision refused for non-driver");
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Only the driver of this ride can update the booking",
        ));
    }

    let booking = state
        .bookings
        .update_status(booking_id, decision)
        .await
        .map_err(port_failure("Failed to update booking"))?;
    Ok(Json(booking.into()))
}

/// GET /api/bookings/history - Bookings made and rides offered by the caller
#[utoipa::path(
    get,
    path = "/api/bookings/history",
    responses(
        (status = 200, description = "Booking history", body = BookingHistoryResponse)
    )
)]
pub async fn booking_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<BookingHistoryResponse>, HandlerError> {
    let history = state
        .bookings
        .history(user_id)
        .await
        .map_err(port_failure("Failed to load booking history"))?;
    Ok(Json(history.into()))
}
