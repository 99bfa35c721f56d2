//! crates/ride_share_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the marketplace core.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage and push-delivery implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AuthSession, Booking, BookingStatus, EntityId, FavoriteLocation, NewBooking,
    NewFavoriteLocation, NewNotification, NewRide, NewUser, Notification, ProfileUpdate, PushRecord,
    Ride, Theme, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Keyed record storage for every entity type.
///
/// Identifiers are assigned by the store, are unique per entity type and are
/// never reused. Nothing is ever deleted apart from auth sessions.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn get_user(&self, user_id: EntityId) -> PortResult<Option<User>>;

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    async fn update_user_profile(
        &self,
        user_id: EntityId,
        profile: ProfileUpdate,
    ) -> PortResult<User>;

    async fn update_user_theme(&self, user_id: EntityId, theme: Theme) -> PortResult<User>;

    // --- Auth sessions ---
    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()>;

    /// Resolves a live session to its user. Expired or unknown ids are `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str, now: DateTime<Utc>)
        -> PortResult<EntityId>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Favourite locations ---
    async fn create_favorite_location(
        &self,
        user_id: EntityId,
        location: NewFavoriteLocation,
    ) -> PortResult<FavoriteLocation>;

    async fn list_favorite_locations(&self, user_id: EntityId)
        -> PortResult<Vec<FavoriteLocation>>;

    // --- Rides ---
    /// Stores a ride for `driver_id`. The ride is always created available.
    async fn create_ride(&self, driver_id: EntityId, ride: NewRide) -> PortResult<Ride>;

    async fn get_ride(&self, ride_id: EntityId) -> PortResult<Option<Ride>>;

    /// Rides that are available and expire strictly after `now`.
    async fn list_available_rides(&self, now: DateTime<Utc>) -> PortResult<Vec<Ride>>;

    async fn list_rides_by_driver(&self, driver_id: EntityId) -> PortResult<Vec<Ride>>;

    /// Flips `available` to false. Returns whether a ride with that id existed.
    async fn mark_ride_unavailable(&self, ride_id: EntityId) -> PortResult<bool>;

    // --- Bookings ---
    async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking>;

    async fn get_booking(&self, booking_id: EntityId) -> PortResult<Option<Booking>>;

    async fn update_booking_status(
        &self,
        booking_id: EntityId,
        status: BookingStatus,
    ) -> PortResult<Booking>;

    async fn list_bookings_by_user(&self, user_id: EntityId) -> PortResult<Vec<Booking>>;

    // --- Notifications ---
    async fn create_notification(&self, notification: NewNotification)
        -> PortResult<Notification>;

    /// All notifications for a user, unordered.
    async fn list_notifications_by_user(&self, user_id: EntityId)
        -> PortResult<Vec<Notification>>;

    /// Sets `read`. Returns whether a notification with that id existed.
    async fn mark_notification_read(&self, notification_id: EntityId) -> PortResult<bool>;
}

/// The real-time mirror that notifications are pushed to.
///
/// Records are appended under the recipient's key; subscribers see the full
/// set on every change. Implementations must not block the caller on slow
/// or absent subscribers.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Appends a record under `user_id`, returning the key the channel gave it.
    async fn publish(&self, user_id: EntityId, record: PushRecord)
        -> PortResult<String>;
}
