pub mod bookings;
pub mod domain;
pub mod notifications;
pub mod ports;
pub mod rides;
pub mod store;

pub use bookings::BookingManager;
pub use domain::{
    AuthSession, Booking, BookingDecision, BookingHistory, BookingStatus, BookingWithRide,
    EntityId, FavoriteLocation, NewFavoriteLocation, NewRide, NewUser, Notification,
    NotificationKind, ProfileUpdate, PushRecord, Ride, Theme, User, UserCredentials,
};
pub use notifications::{NotificationDraft, NotificationFanout};
pub use ports::{EntityStore, PortError, PortResult, PushChannel};
pub use rides::RideManager;
pub use store::MemoryStore;
