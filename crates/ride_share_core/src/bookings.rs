//! crates/ride_share_core/src/bookings.rs
//!
//! Booking lifecycle: riders request seats, drivers accept or reject, and each
//! step notifies the other side.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{
    Booking, BookingDecision, BookingHistory, BookingStatus, BookingWithRide, EntityId,
    NewBooking, NotificationKind, Ride,
};
use crate::notifications::{NotificationDraft, NotificationFanout};
use crate::ports::{EntityStore, PortError, PortResult};
use crate::rides::RideManager;

const ACCEPTED_MESSAGE: &str = "Great news! Your ride request has been accepted.";
const DECLINED_MESSAGE: &str = "Sorry, your ride request has been declined.";

#[derive(Clone)]
pub struct BookingManager {
    store: Arc<dyn EntityStore>,
    rides: RideManager,
    notifier: NotificationFanout,
}

impl BookingManager {
    pub fn new(
        store: Arc<dyn EntityStore>,
        rides: RideManager,
        notifier: NotificationFanout,
    ) -> Self {
        Self {
            store,
            rides,
            notifier,
        }
    }

    /// Books a seat on `ride_id` for `rider_id` and tells the driver.
    ///
    /// Fails with `NotFound` when the ride does not exist.
    pub async fn create_booking(
        &self,
        rider_id: EntityId,
        ride_id: EntityId,
        is_parcel: bool,
    ) -> PortResult<Booking> {
        let ride = self
            .rides
            .get_ride(ride_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Ride {} not found", ride_id)))?;

        let booking = self
            .store
            .create_booking(NewBooking {
                ride_id,
                user_id: rider_id,
                status: BookingStatus::Pending,
                is_parcel,
                created_at: Utc::now(),
            })
            .await?;
        info!(booking_id = booking.id, ride_id, rider_id, "Booking created");

        let rider_name = match self.store.get_user(rider_id).await? {
            Some(user) => user.display_name().to_string(),
            None => "A rider".to_string(),
        };
        self.notifier
            .notify(NotificationDraft {
                recipient: ride.driver_id,
                title: "New Ride Request".to_string(),
                message: format!(
                    "{} wants to book your ride from {} to {}",
                    rider_name, ride.from, ride.to
                ),
                kind: NotificationKind::RideRequest,
                related_ride_id: Some(ride.id),
                related_booking_id: Some(booking.id),
            })
            .await?;

        Ok(booking)
    }

    /// Records the driver's decision and tells the rider.
    ///
    /// The status is written first; acceptance then takes the ride off the
    /// market. Repeating a decision is allowed and notifies again.
    pub async fn update_status(
        &self,
        booking_id: EntityId,
        decision: BookingDecision,
    ) -> PortResult<Booking> {
        let status = BookingStatus::from(decision);
        let booking = self.store.update_booking_status(booking_id, status).await?;
        info!(booking_id, status = %status, "Booking status updated");

        if decision == BookingDecision::Accepted {
            self.rides.mark_unavailable(booking.ride_id).await?;
        }

        let (title, message) = match decision {
            BookingDecision::Accepted => ("Ride Request Accepted", ACCEPTED_MESSAGE),
            BookingDecision::Rejected => ("Ride Request Rejected", DECLINED_MESSAGE),
        };
        self.notifier
            .notify(NotificationDraft {
                recipient: booking.user_id,
                title: title.to_string(),
                message: message.to_string(),
                kind: NotificationKind::RideResponse,
                related_ride_id: Some(booking.ride_id),
                related_booking_id: Some(booking.id),
            })
            .await?;

        Ok(booking)
    }

    /// The rider's bookings, each with its ride.
    pub async fn list_for_user(&self, user_id: EntityId) -> PortResult<Vec<BookingWithRide>> {
        let bookings = self.store.list_bookings_by_user(user_id).await?;
        let mut joined = Vec::with_capacity(bookings.len());
        for booking in bookings {
            match self.rides.get_ride(booking.ride_id).await? {
                Some(ride) => joined.push(BookingWithRide { booking, ride }),
                None => warn!(
                    booking_id = booking.id,
                    ride_id = booking.ride_id,
                    "Booking refers to a missing ride, left out of listing"
                ),
            }
        }
        Ok(joined)
    }

    /// Rides the user has posted as a driver.
    pub async fn list_offered(&self, user_id: EntityId) -> PortResult<Vec<Ride>> {
        self.rides.list_offered(user_id).await
    }

    pub async fn history(&self, user_id: EntityId) -> PortResult<BookingHistory> {
        Ok(BookingHistory {
            bookings: self.list_for_user(user_id).await?,
            offered_rides: self.list_offered(user_id).await?,
        })
    }
}
