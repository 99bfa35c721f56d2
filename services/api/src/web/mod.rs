pub mod auth;
pub mod bookings;
pub mod dto;
pub mod middleware;
pub mod notifications;
pub mod profile;
pub mod protocol;
pub mod rest;
pub mod rides;
pub mod state;
pub mod ws_handler;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use middleware::require_auth;
pub use state::AppState;
pub use ws_handler::live_notifications_handler;

/// Builds every `/api` route over the shared state.
///
/// CORS and the Swagger UI are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/register", post(auth::register_handler))
        .route("/api/login", post(auth::login_handler))
        .route("/api/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/user", get(profile::current_user_handler))
        .route("/api/profile", patch(profile::update_profile_handler))
        .route("/api/profile/theme", patch(profile::update_theme_handler))
        .route(
            "/api/locations",
            get(profile::list_locations_handler).post(profile::create_location_handler),
        )
        .route(
            "/api/rides",
            get(rides::list_rides_handler).post(rides::create_ride_handler),
        )
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route(
            "/api/bookings/history",
            get(bookings::booking_history_handler),
        )
        .route(
            "/api/bookings/{id}/status",
            patch(bookings::update_booking_status_handler),
        )
        .route(
            "/api/notifications",
            get(notifications::list_notifications_handler),
        )
        .route(
            "/api/notifications/{id}/read",
            patch(notifications::mark_notification_read_handler),
        )
        .route("/api/notifications/live", get(live_notifications_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
