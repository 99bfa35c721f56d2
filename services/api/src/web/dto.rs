//! services/api/src/web/dto.rs
//!
//! JSON request and response payloads. Field names are camelCase on the wire.
//! Requests are checked here before anything reaches the core.

use chrono::{DateTime, Utc};
use ride_share_core::domain::{
    Booking, BookingHistory, BookingWithRide, EntityId, FavoriteLocation, NewFavoriteLocation,
    NewRide, Notification, ProfileUpdate, Ride, User,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::adapters::push::PushedNotification;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
}

impl From<ProfileUpdateRequest> for ProfileUpdate {
    fn from(req: ProfileUpdateRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            profile_image: req.profile_image,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ThemeRequest {
    /// `light` or `dark`.
    pub theme: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLocationRequest {
    pub name: String,
    pub address: String,
    /// Category tag such as `home`, `work` or `college`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl CreateLocationRequest {
    pub fn validate(self) -> Result<NewFavoriteLocation, String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.address.trim().is_empty() {
            return Err("address must not be empty".to_string());
        }
        Ok(NewFavoriteLocation {
            name: self.name,
            address: self.address,
            kind: self.kind,
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub from: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub seats: i32,
    pub price: i32,
    /// RFC 3339 timestamp after which the ride is no longer listed.
    pub expires_at: String,
    #[serde(default)]
    pub accepts_parcel: bool,
    pub car_model: Option<String>,
    pub car_number: Option<String>,
    pub comments: Option<String>,
}

impl CreateRideRequest {
    pub fn validate(self) -> Result<NewRide, String> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err("from and to must not be empty".to_string());
        }
        if self.seats < 1 {
            return Err("seats must be at least 1".to_string());
        }
        if self.price < 0 {
            return Err("price must not be negative".to_string());
        }
        let expires_at = DateTime::parse_from_rfc3339(&self.expires_at)
            .map_err(|e| format!("expiresAt is not an RFC 3339 timestamp: {}", e))?
            .with_timezone(&Utc);

        Ok(NewRide {
            from: self.from,
            to: self.to,
            date: self.date,
            time: self.time,
            seats: self.seats,
            price: self.price,
            expires_at,
            accepts_parcel: self.accepts_parcel,
            car_model: self.car_model,
            car_number: self.car_number,
            comments: self.comments,
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub ride_id: EntityId,
    #[serde(default)]
    pub is_parcel: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// `accepted` or `rejected`.
    pub status: String,
}

//=========================================================================================
// Response Payloads
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: EntityId,
    pub username: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub theme: String,
    pub profile_image: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            phone: user.phone,
            theme: user.theme.as_str().to_string(),
            profile_image: user.profile_image,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLocationResponse {
    pub id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<FavoriteLocation> for FavoriteLocationResponse {
    fn from(location: FavoriteLocation) -> Self {
        Self {
            id: location.id,
            user_id: location.user_id,
            name: location.name,
            address: location.address,
            kind: location.kind,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    pub id: EntityId,
    pub driver_id: EntityId,
    pub from: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub seats: i32,
    pub price: i32,
    pub available: bool,
    pub expires_at: DateTime<Utc>,
    pub accepts_parcel: bool,
    pub car_model: Option<String>,
    pub car_number: Option<String>,
    pub comments: Option<String>,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            id: ride.id,
            driver_id: ride.driver_id,
            from: ride.from,
            to: ride.to,
            date: ride.date,
            time: ride.time,
            seats: ride.seats,
            price: ride.price,
            available: ride.available,
            expires_at: ride.expires_at,
            accepts_parcel: ride.accepts_parcel,
            car_model: ride.car_model,
            car_number: ride.car_number,
            comments: ride.comments,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: EntityId,
    pub ride_id: EntityId,
    pub user_id: EntityId,
    pub status: String,
    pub is_parcel: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            ride_id: booking.ride_id,
            user_id: booking.user_id,
            status: booking.status.as_str().to_string(),
            is_parcel: booking.is_parcel,
            created_at: booking.created_at,
        }
    }
}

/// A booking with its ride embedded under `ride`.
#[derive(Serialize, ToSchema)]
pub struct BookingWithRideResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub ride: RideResponse,
}

impl From<BookingWithRide> for BookingWithRideResponse {
    fn from(joined: BookingWithRide) -> Self {
        Self {
            booking: joined.booking.into(),
            ride: joined.ride.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryResponse {
    pub bookings: Vec<BookingWithRideResponse>,
    pub offered_rides: Vec<RideResponse>,
}

impl From<BookingHistory> for BookingHistoryResponse {
    fn from(history: BookingHistory) -> Self {
        Self {
            bookings: history.bookings.into_iter().map(Into::into).collect(),
            offered_rides: history.offered_rides.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub related_ride_id: Option<EntityId>,
    pub related_booking_id: Option<EntityId>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            kind: n.kind.as_str().to_string(),
            read: n.read,
            created_at: n.created_at,
            related_ride_id: n.related_ride_id,
            related_booking_id: n.related_booking_id,
        }
    }
}

/// A notification as delivered over the live feed. `id` is the push key.
///
/// `read` is always false here; the REST listing is authoritative.
#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PushNotificationPayload {
    pub id: String,
    pub user_id: EntityId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub related_ride_id: Option<EntityId>,
    pub related_booking_id: Option<EntityId>,
}

impl From<&PushedNotification> for PushNotificationPayload {
    fn from(pushed: &PushedNotification) -> Self {
        let record = &pushed.record;
        Self {
            id: pushed.key.clone(),
            user_id: record.user_id,
            title: record.title.clone(),
            message: record.message.clone(),
            kind: record.kind.as_str().to_string(),
            read: false,
            created_at: record.created_at,
            related_ride_id: record.related_ride_id,
            related_booking_id: record.related_booking_id,
        }
    }
}
