//! services/api/src/adapters/db.rs
//!
//! This module contains the PostgreSQL adapter, a concrete implementation of the
//! `EntityStore` port from the `core` crate. It handles all interactions with the
//! database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ride_share_core::domain::{
    AuthSession, Booking, BookingStatus, EntityId, FavoriteLocation, NewBooking,
    NewFavoriteLocation, NewNotification, NewRide, NewUser, Notification, ProfileUpdate, Ride,
    Theme, User, UserCredentials,
};
use ride_share_core::ports::{EntityStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `EntityStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Maps driver errors onto the port taxonomy using Postgres SQLSTATE codes.
fn map_sqlx(e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("23505") => return PortError::Conflict(db.message().to_string()),
            Some("23503") => return PortError::NotFound(db.message().to_string()),
            _ => {}
        }
    }
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("row not found".to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

fn parse_column<T>(value: &str) -> PortResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse::<T>().map_err(PortError::Unexpected)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, username, password, name, phone, theme, profile_image";

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password: String,
    name: Option<String>,
    phone: Option<String>,
    theme: String,
    profile_image: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            username: self.username,
            name: self.name,
            phone: self.phone,
            theme: parse_column::<Theme>(&self.theme)?,
            profile_image: self.profile_image,
        })
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            username: self.username,
            hashed_password: self.password,
        }
    }
}

const LOCATION_COLUMNS: &str = "id, user_id, name, address, category";

#[derive(FromRow)]
struct FavoriteLocationRecord {
    id: i64,
    user_id: i64,
    name: String,
    address: String,
    category: String,
}
impl FavoriteLocationRecord {
    fn to_domain(self) -> FavoriteLocation {
        FavoriteLocation {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            address: self.address,
            kind: self.category,
        }
    }
}

const RIDE_COLUMNS: &str = "id, driver_id, from_location, to_location, ride_date, ride_time, \
     seats, price, available, expires_at, accepts_parcel, car_model, car_number, comments";

#[derive(FromRow)]
struct RideRecord {
    id: i64,
    driver_id: i64,
    from_location: String,
    to_location: String,
    ride_date: String,
    ride_time: String,
    seats: i32,
    price: i32,
    available: bool,
    expires_at: DateTime<Utc>,
    accepts_parcel: bool,
    car_model: Option<String>,
    car_number: Option<String>,
    comments: Option<String>,
}
impl RideRecord {
    fn to_domain(self) -> Ride {
        Ride {
            id: self.id,
            driver_id: self.driver_id,
            from: self.from_location,
            to: self.to_location,
            date: self.ride_date,
            time: self.ride_time,
            seats: self.seats,
            price: self.price,
            available: self.available,
            expires_at: self.expires_at,
            accepts_parcel: self.accepts_parcel,
            car_model: self.car_model,
            car_number: self.car_number,
            comments: self.comments,
        }
    }
}

const BOOKING_COLUMNS: &str = "id, ride_id, user_id, status, is_parcel, created_at";

#[derive(FromRow)]
struct BookingRecord {
    id: i64,
    ride_id: i64,
    user_id: i64,
    status: String,
    is_parcel: bool,
    created_at: DateTime<Utc>,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        Ok(Booking {
            id: self.id,
            ride_id: self.ride_id,
            user_id: self.user_id,
            status: parse_column::<BookingStatus>(&self.status)?,
            is_parcel: self.is_parcel,
            created_at: self.created_at,
        })
    }
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, kind, is_read, created_at, \
     related_ride_id, related_booking_id";

#[derive(FromRow)]
struct NotificationRecord {
    id: i64,
    user_id: i64,
    title: String,
    message: String,
    kind: String,
    is_read: bool,
    created_at: DateTime<Utc>,
    related_ride_id: Option<i64>,
    related_booking_id: Option<i64>,
}
impl NotificationRecord {
    fn to_domain(self) -> PortResult<Notification> {
        Ok(Notification {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            kind: parse_column(&self.kind)?,
            read: self.is_read,
            created_at: self.created_at,
            related_ride_id: self.related_ride_id,
            related_booking_id: self.related_booking_id,
        })
    }
}

//=========================================================================================
// `EntityStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntityStore for PgStore {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password, name, phone, theme, profile_image) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.username)
            .bind(&user.hashed_password)
            .bind(&user.name)
            .bind(&user.phone)
            .bind(user.theme.as_str())
            .bind(&user.profile_image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match map_sqlx(e) {
                PortError::Conflict(_) => PortError::Conflict(format!(
                    "username '{}' is already taken",
                    user.username
                )),
                other => other,
            })?;
        record.to_domain()
    }

    async fn get_user(&self, user_id: EntityId) -> PortResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(UserRecord::to_domain)
            .transpose()
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(UserRecord::to_credentials)
            .ok_or_else(|| PortError::NotFound(format!("User '{}' not found", username)))
    }

    async fn update_user_profile(
        &self,
        user_id: EntityId,
        profile: ProfileUpdate,
    ) -> PortResult<User> {
        let sql = format!(
            "UPDATE users SET name = COALESCE($2, name), phone = COALESCE($3, phone), \
             profile_image = COALESCE($4, profile_image) WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(profile.name)
            .bind(profile.phone)
            .bind(profile.profile_image)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
            .to_domain()
    }

    async fn update_user_theme(&self, user_id: EntityId, theme: Theme) -> PortResult<User> {
        let sql = format!("UPDATE users SET theme = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(theme.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
            .to_domain()
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn validate_auth_session(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> PortResult<EntityId> {
        let user_id: Option<(i64,)> =
            sqlx::query_as("SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > $2")
                .bind(session_id)
                .bind(now)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        if let Some((user_id,)) = user_id {
            return Ok(user_id);
        }

        // Drop the row if it exists but has expired.
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1 AND expires_at <= $2")
            .bind(session_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Err(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn create_favorite_location(
        &self,
        user_id: EntityId,
        location: NewFavoriteLocation,
    ) -> PortResult<FavoriteLocation> {
        let sql = format!(
            "INSERT INTO favorite_locations (user_id, name, address, category) \
             VALUES ($1, $2, $3, $4) RETURNING {LOCATION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, FavoriteLocationRecord>(&sql)
            .bind(user_id)
            .bind(location.name)
            .bind(location.address)
            .bind(location.kind)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(record.to_domain())
    }

    async fn list_favorite_locations(
        &self,
        user_id: EntityId,
    ) -> PortResult<Vec<FavoriteLocation>> {
        let sql =
            format!("SELECT {LOCATION_COLUMNS} FROM favorite_locations WHERE user_id = $1 ORDER BY id");
        let records = sqlx::query_as::<_, FavoriteLocationRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_ride(&self, driver_id: EntityId, ride: NewRide) -> PortResult<Ride> {
        let sql = format!(
            "INSERT INTO rides (driver_id, from_location, to_location, ride_date, ride_time, \
             seats, price, available, expires_at, accepts_parcel, car_model, car_number, comments) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9, $10, $11, $12) \
             RETURNING {RIDE_COLUMNS}"
        );
        let record = sqlx::query_as::<_, RideRecord>(&sql)
            .bind(driver_id)
            .bind(ride.from)
            .bind(ride.to)
            .bind(ride.date)
            .bind(ride.time)
            .bind(ride.seats)
            .bind(ride.price)
            .bind(ride.expires_at)
            .bind(ride.accepts_parcel)
            .bind(ride.car_model)
            .bind(ride.car_number)
            .bind(ride.comments)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(record.to_domain())
    }

    async fn get_ride(&self, ride_id: EntityId) -> PortResult<Option<Ride>> {
        let sql = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1");
        let record = sqlx::query_as::<_, RideRecord>(&sql)
            .bind(ride_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(record.map(RideRecord::to_domain))
    }

    async fn list_available_rides(&self, now: DateTime<Utc>) -> PortResult<Vec<Ride>> {
        let sql = format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE available AND expires_at > $1 ORDER BY id"
        );
        let records = sqlx::query_as::<_, RideRecord>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(records.into_iter().map(RideRecord::to_domain).collect())
    }

    async fn list_rides_by_driver(&self, driver_id: EntityId) -> PortResult<Vec<Ride>> {
        let sql = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE driver_id = $1 ORDER BY id");
        let records = sqlx::query_as::<_, RideRecord>(&sql)
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(records.into_iter().map(RideRecord::to_domain).collect())
    }

    async fn mark_ride_unavailable(&self, ride_id: EntityId) -> PortResult<bool> {
        // A single UPDATE keeps the flip atomic across concurrent requests.
        let result = sqlx::query("UPDATE rides SET available = FALSE WHERE id = $1")
            .bind(ride_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_booking(&self, booking: NewBooking) -> PortResult<Booking> {
        // Inserting through a SELECT means a missing ride produces no row, so
        // no id is drawn from the sequence.
        let sql = format!(
            "INSERT INTO bookings (ride_id, user_id, status, is_parcel, created_at) \
             SELECT $1, $2, $3, $4, $5 WHERE EXISTS (SELECT 1 FROM rides WHERE id = $1) \
             RETURNING {BOOKING_COLUMNS}"
        );
        let ride_missing = || PortError::NotFound(format!("Ride {} not found", booking.ride_id));
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking.ride_id)
            .bind(booking.user_id)
            .bind(booking.status.as_str())
            .bind(booking.is_parcel)
            .bind(booking.created_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match map_sqlx(e) {
                PortError::NotFound(_) => ride_missing(),
                other => other,
            })?
            .ok_or_else(ride_missing)?
            .to_domain()
    }

    async fn get_booking(&self, booking_id: EntityId) -> PortResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(BookingRecord::to_domain)
            .transpose()
    }

    async fn update_booking_status(
        &self,
        booking_id: EntityId,
        status: BookingStatus,
    ) -> PortResult<Booking> {
        let sql = format!("UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {BOOKING_COLUMNS}");
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))?
            .to_domain()
    }

    async fn list_bookings_by_user(&self, user_id: EntityId) -> PortResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY id");
        let records = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        records.into_iter().map(BookingRecord::to_domain).collect()
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> PortResult<Notification> {
        let sql = format!(
            "INSERT INTO notifications (user_id, title, message, kind, is_read, created_at, \
             related_ride_id, related_booking_id) VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7) \
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRecord>(&sql)
            .bind(notification.user_id)
            .bind(notification.title)
            .bind(notification.message)
            .bind(notification.kind.as_str())
            .bind(notification.created_at)
            .bind(notification.related_ride_id)
            .bind(notification.related_booking_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?
            .to_domain()
    }

    async fn list_notifications_by_user(
        &self,
        user_id: EntityId,
    ) -> PortResult<Vec<Notification>> {
        let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1");
        let records = sqlx::query_as::<_, NotificationRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        records.into_iter().map(NotificationRecord::to_domain).collect()
    }

    async fn mark_notification_read(&self, notification_id: EntityId) -> PortResult<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
