//! crates/ride_share_core/src/domain.rs
//!
//! Defines the pure, core data structures for the marketplace.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Identifier type shared by every entity table.
pub type EntityId = i64;

//=========================================================================================
// Users
//=========================================================================================

/// Colour scheme a user picked for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub theme: Theme,
    pub profile_image: Option<String>,
}

impl User {
    /// The name shown to other users: the display name, or the handle when unset.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

// Only used internally for login/registration - contains the password hash
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: EntityId,
    pub username: String,
    pub hashed_password: String,
}

/// Input for registering a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub theme: Theme,
    pub profile_image: Option<String>,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: EntityId,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Favourite locations
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteLocation {
    pub id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub address: String,
    /// Free-form category such as `home`, `work` or `college`.
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct NewFavoriteLocation {
    pub name: String,
    pub address: String,
    pub kind: String,
}

//=========================================================================================
// Rides
//=========================================================================================

/// An offer by a driver to carry others along a route.
///
/// `date` and `time` are kept as the driver typed them; only `expires_at`
/// takes part in any comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
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

/// Driver-supplied fields of a ride. Owner and availability are set by the core.
#[derive(Debug, Clone)]
pub struct NewRide {
    pub from: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub seats: i32,
    pub price: i32,
    pub expires_at: DateTime<Utc>,
    pub accepts_parcel: bool,
    pub car_model: Option<String>,
    pub car_number: Option<String>,
    pub comments: Option<String>,
}

//=========================================================================================
// Bookings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "rejected" => Ok(BookingStatus::Rejected),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

/// The only statuses a driver may move a booking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDecision {
    Accepted,
    Rejected,
}

impl From<BookingDecision> for BookingStatus {
    fn from(decision: BookingDecision) -> Self {
        match decision {
            BookingDecision::Accepted => BookingStatus::Accepted,
            BookingDecision::Rejected => BookingStatus::Rejected,
        }
    }
}

impl FromStr for BookingDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(BookingDecision::Accepted),
            "rejected" => Ok(BookingDecision::Rejected),
            other => Err(format!(
                "status must be 'accepted' or 'rejected', got '{}'",
                other
            )),
        }
    }
}

/// A rider's request to occupy a seat on a specific ride.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: EntityId,
    pub ride_id: EntityId,
    pub user_id: EntityId,
    pub status: BookingStatus,
    pub is_parcel: bool,
    pub created_at: DateTime<Utc>,
}

/// A booking as it is inserted. The store only assigns the id.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub ride_id: EntityId,
    pub user_id: EntityId,
    pub status: BookingStatus,
    pub is_parcel: bool,
    pub created_at: DateTime<Utc>,
}

/// A booking joined with the ride it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingWithRide {
    pub booking: Booking,
    pub ride: Ride,
}

/// Everything a user has on either side of the marketplace.
#[derive(Debug, Clone, Default)]
pub struct BookingHistory {
    pub bookings: Vec<BookingWithRide>,
    pub offered_rides: Vec<Ride>,
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    RideRequest,
    RideResponse,
    System,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::RideRequest => "ride_request",
            NotificationKind::RideResponse => "ride_response",
            NotificationKind::System => "system",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ride_request" => Ok(NotificationKind::RideRequest),
            "ride_response" => Ok(NotificationKind::RideResponse),
            "system" => Ok(NotificationKind::System),
            other => Err(format!("unknown notification kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub related_ride_id: Option<EntityId>,
    pub related_booking_id: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: EntityId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub related_ride_id: Option<EntityId>,
    pub related_booking_id: Option<EntityId>,
}

/// The copy of a notification mirrored to the push channel.
///
/// It has no store id and no read state of its own: the channel assigns its
/// own key, and read/unread is tracked only on [`Notification`].
#[derive(Debug, Clone, PartialEq)]
pub struct PushRecord {
    pub user_id: EntityId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub related_ride_id: Option<EntityId>,
    pub related_booking_id: Option<EntityId>,
}

impl From<&Notification> for PushRecord {
    fn from(n: &Notification) -> Self {
        Self {
            user_id: n.user_id,
            title: n.title.clone(),
            message: n.message.clone(),
            kind: n.kind,
            created_at: n.created_at,
            related_ride_id: n.related_ride_id,
            related_booking_id: n.related_booking_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = User {
            id: 1,
            username: "ana".to_string(),
            name: None,
            phone: None,
            theme: Theme::Dark,
            profile_image: None,
        };
        assert_eq!(user.display_name(), "ana");
        user.name = Some("  ".to_string());
        assert_eq!(user.display_name(), "ana");
        user.name = Some("Ana Lima".to_string());
        assert_eq!(user.display_name(), "Ana Lima");
    }

    #[test]
    fn decision_rejects_pending_and_garbage() {
        assert_eq!("accepted".parse(), Ok(BookingDecision::Accepted));
        assert_eq!("rejected".parse(), Ok(BookingDecision::Rejected));
        assert!("pending".parse::<BookingDecision>().is_err());
        assert!("ACCEPTED".parse::<BookingDecision>().is_err());
    }
}
