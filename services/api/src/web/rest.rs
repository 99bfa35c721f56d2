//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the mapping from
//! port errors to HTTP responses shared by every handler.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use ride_share_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::web::dto::{
    BookingHistoryResponse, BookingResponse, BookingWithRideResponse, CreateBookingRequest,
    CreateLocationRequest, CreateRideRequest, FavoriteLocationResponse, LoginRequest,
    NotificationResponse, ProfileUpdateRequest, PushNotificationPayload, RegisterRequest,
    RideResponse, ThemeRequest, UpdateBookingStatusRequest, UserResponse,
};
use crate::web::{auth, bookings, notifications, profile, rides};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        profile::current_user_handler,
        profile::update_profile_handler,
        profile::update_theme_handler,
        profile::create_location_handler,
        profile::list_locations_handler,
        rides::create_ride_handler,
        rides::list_rides_handler,
        bookings::create_booking_handler,
        bookings::update_booking_status_handler,
        bookings::booking_history_handler,
        notifications::list_notifications_handler,
        notifications::mark_notification_read_handler,
    ),
    components(
        schemas(
            ErrorBody,
            RegisterRequest,
            LoginRequest,
            UserResponse,
            ProfileUpdateRequest,
            ThemeRequest,
            CreateLocationRequest,
            FavoriteLocationResponse,
            CreateRideRequest,
            RideResponse,
            CreateBookingRequest,
            UpdateBookingStatusRequest,
            BookingResponse,
            BookingWithRideResponse,
            BookingHistoryResponse,
            NotificationResponse,
            PushNotificationPayload,
        )
    ),
    tags(
        (name = "Ride Share API", description = "Ride offers, bookings and notifications.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Responses
//=========================================================================================

/// The body of every error response.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorBody {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> HandlerError {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// Bodies that fail to deserialize are validation errors, reported as 400.
pub fn json_rejection(rejection: JsonRejection) -> HandlerError {
    bad_request(rejection.body_text())
}

/// Maps a port error to a response. Unexpected failures are logged with
/// `context` and hidden from the client.
pub fn port_failure(context: &'static str) -> impl FnOnce(PortError) -> HandlerError {
    move |e| match e {
        PortError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => error_response(StatusCode::CONFLICT, msg),
        PortError::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        PortError::Unexpected(msg) => {
            error!("{}: {}", context, msg);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_statuses() {
        let (status, Json(body)) = port_failure("lookup")(PortError::NotFound("Ride 3".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Ride 3");

        let (status, _) = port_failure("lookup")(PortError::Conflict("taken".into()));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, Json(body)) =
            port_failure("Failed to load rides")(PortError::Unexpected("pool timed out".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to load rides");
    }

    #[test]
    fn openapi_document_lists_the_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for expected in [
            "/api/rides",
            "/api/bookings",
            "/api/bookings/{id}/status",
            "/api/notifications/{id}/read",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
        }
    }
}
