//! crates/ride_share_core/src/store.rs
//!
//! The in-memory `EntityStore`: one keyed table per entity type, each with its
//! own id counter. State lives for the lifetime of the process only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::{
    AuthSession, Booking, BookingStatus, EntityId, FavoriteLocation, NewBooking,
    NewFavoriteLocation, NewNotification, NewRide, NewUser, Notification, ProfileUpdate, Ride,
    Theme, User, UserCredentials,
};
use crate::ports::{EntityStore, PortError, PortResult};

//=========================================================================================
// Generic Table
//=========================================================================================

/// A keyed collection of one entity type.
///
/// Ids start at 1 and advance on every `create`; rows are never removed.
#[derive(Debug)]
pub struct Table<T> {
    entity: &'static str,
    rows: BTreeMap<EntityId, T>,
    next_id: EntityId,
}

impl<T: Clone> Table<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Assigns the next id, builds the row from it and stores it.
    pub fn create(&mut self, build: impl FnOnce(EntityId) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Rows matching `predicate`, in id order.
    pub fn list(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    /// Applies `patch` in place and returns the updated row.
    pub fn update(&mut self, id: EntityId, patch: impl FnOnce(&mut T)) -> PortResult<T> {
        let row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", self.entity, id)))?;
        patch(row);
        Ok(row.clone())
    }
}

//=========================================================================================
// The Store
//=========================================================================================

#[derive(Debug, Clone)]
struct UserRow {
    user: User,
    hashed_password: String,
}

#[derive(Debug)]
struct Tables {
    users: Table<UserRow>,
    rides: Table<Ride>,
    bookings: Table<Booking>,
    favorite_locations: Table<FavoriteLocation>,
    notifications: Table<Notification>,
    auth_sessions: HashMap<String, AuthSession>,
}

/// Process-local implementation of [`EntityStore`].
///
/// Every mutation happens under a single write guard, so read-modify-write
/// sequences such as the availability flip cannot interleave.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                users: Table::new("User"),
                rides: Table::new("Ride"),
                bookings: Table::new("Booking"),
                favorite_locations: Table::new("FavoriteLocation"),
                notifications: Table::new("Notification"),
                auth_sessions: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// `EntityStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .rows
            .values()
            .any(|row| row.user.username == new_user.username);
        if taken {
            return Err(PortError::Conflict(format!(
                "username '{}' is already taken",
                new_user.username
            )));
        }

        let row = tables.users.create(|id| UserRow {
            user: User {
                id,
                username: new_user.username,
                name: new_user.name,
                phone: new_user.phone,
                theme: new_user.theme,
                profile_image: new_user.profile_image,
            },
            hashed_password: new_user.hashed_password,
        });
        Ok(row.user)
    }

    async fn get_user(&self, user_id: EntityId) -> PortResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(user_id).map(|row| row.user.clone()))
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.read().await;
        tables
            .users
            .rows
            .values()
            .find(|row| row.user.username == username)
            .map(|row| UserCredentials {
                user_id: row.user.id,
                username: row.user.username.clone(),
                hashed_password: row.hashed_password.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User '{}' not found", username)))
    }

    async fn update_user_profile(
        &self,
        user_id: EntityId,
        profile: ProfileUpdate,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let row = tables.users.update(user_id, |row| {
            if let Some(name) = profile.name {
                row.user.name = Some(name);
            }
            if let Some(phone) = profile.phone {
                row.user.phone = Some(phone);
            }
            if let Some(image) = profile.profile_image {
                row.user.profile_image = Some(image);
            }
        })?;
        Ok(row.user)
    }

    async fn update_user_theme(&self, user_id: EntityId, theme: Theme) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let row = tables.users.update(user_id, |row| row.user.theme = theme)?;
        Ok(row.user)
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.auth_sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn validate_auth_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> PortResult<EntityId> {
        let mut tables = self.tables.write().await;
        let found = tables
            .auth_sessions
            .get(session_id)
            .map(|session| (session.user_id, session.expires_at));
        match found {
            Some((user_id, expires_at)) if expires_at > now => Ok(user_id),
            Some(_) => {
                tables.auth_sessions.remove(session_id);
                Err(PortError::Unauthorized)
            }
            None => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn create_favorite_location(
        &self,
        user_id: EntityId,
        location: NewFavoriteLocation,
    ) -> PortResult<FavoriteLocation> {
        let mut tables = self.tables.write().await;
        Ok(tables.favorite_locations.create(|id| FavoriteLocation {
            id,
            user_id,
            name: location.name,
            address: location.address,
            kind: location.kind,
        }))
    }

    async fn list_favorite_locations(
        &self,
        user_id: EntityId,
    ) -> PortResult<Vec<FavoriteLocation>> {
        let tables = self.tables.read().await;
        Ok(tables.favorite_locations.list(|l| l.user_id == user_id))
    }

    async fn create_ride(&self, driver_id: EntityId, ride: NewRide) -> PortResult<Ride> {
        let mut tables = self.tables.write().await;
        Ok(tables.rides.create(|id| Ride {
            id,
            driver_id,
            from: ride.from,
            to: ride.to,
            date: ride.date,
            time: ride.time,
            seats: ride.seats,
            price: ride.price,
            available: true,
            expires_at: ride.expires_at,
            accepts_parcel: ride.accepts_parcel,
            car_model: ride.car_model,
            car_number: ride.car_number,
            comments: ride.comments,
        }))
    }

    async fn get_ride(&self, ride_id: EntityId) -> PortResult<Option<Ride>> {
        let tables = self.tables.read().await;
        Ok(tables.rides.get(ride_id).cloned())
    }

    async fn list_available_rides(&self, now: DateTime<Utc>) -> PortResult<Vec<Ride>> {
        let tables = self.tables.read().await;
        Ok(tables.rides.list(|r| r.available && r.expires_at > now))
    }

    async fn list_rides_by_driver(&self, driver_id: EntityId) -> PortResult<Vec<Ride>> {
        let tables = self.tables.read().await;
        Ok(tables.rides.list(|r| r.driver_id == driver_id))
    }

    async fn mark_ride_unavailable(&self, ride_id: EntityId) -> PortResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.rides.update(ride_id, |r| r.available = false) {
            Ok(_) => Ok(true),
            Err(PortError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking> {
        let mut tables = self.tables.write().await;
        if tables.rides.get(booking.ride_id).is_none() {
            return Err(PortError::NotFound(format!(
                "Ride {} not found",
                booking.ride_id
            )));
        }
        Ok(tables.bookings.create(|id| Booking {
            id,
            ride_id: booking.ride_id,
            user_id: booking.user_id,
            status: booking.status,
            is_parcel: booking.is_parcel,
            created_at: booking.created_at,
        }))
    }

    async fn get_booking(&self, booking_id: EntityId) -> PortResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.get(booking_id).cloned())
    }

    async fn update_booking_status(
        &self,
        booking_id: EntityId,
        status: BookingStatus,
    ) -> PortResult<Booking> {
        let mut tables = self.tables.write().await;
        tables.bookings.update(booking_id, |b| b.status = status)
    }

    async fn list_bookings_by_user(&self, user_id: EntityId) -> PortResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.list(|b| b.user_id == user_id))
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> PortResult<Notification> {
        let mut tables = self.tables.write().await;
        Ok(tables.notifications.create(|id| Notification {
            id,
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            read: false,
            created_at: notification.created_at,
            related_ride_id: notification.related_ride_id,
            related_booking_id: notification.related_booking_id,
        }))
    }

    async fn list_notifications_by_user(
        &self,
        user_id: EntityId,
    ) -> PortResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        Ok(tables.notifications.list(|n| n.user_id == user_id))
    }

    async fn mark_notification_read(&self, notification_id: EntityId) -> PortResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.notifications.update(notification_id, |n| n.read = true) {
            Ok(_) => Ok(true),
            Err(PortError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
