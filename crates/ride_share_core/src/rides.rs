//! crates/ride_share_core/src/rides.rs
//!
//! Ride lifecycle: creation, the availability listing, and the single
//! mutation a ride ever sees.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{EntityId, NewRide, Ride};
use crate::ports::{EntityStore, PortResult};

#[derive(Clone)]
pub struct RideManager {
    store: Arc<dyn EntityStore>,
}

impl RideManager {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Posts a ride owned by `driver_id`. New rides are always available.
    pub async fn create_ride(&self, driver_id: EntityId, ride: NewRide) -> PortResult<Ride> {
        let ride = self.store.create_ride(driver_id, ride).await?;
        info!(ride_id = ride.id, driver_id, "Ride created");
        Ok(ride)
    }

    pub async fn get_ride(&self, ride_id: EntityId) -> PortResult<Option<Ride>> {
        self.store.get_ride(ride_id).await
    }

    /// Rides still open for booking at `now`.
    ///
    /// Expired rides are only hidden here; their stored flag is untouched.
    pub async fn list_available_rides(&self, now: DateTime<Utc>) -> PortResult<Vec<Ride>> {
        self.store.list_available_rides(now).await
    }

    /// Rides posted by `driver_id`, booked or not.
    pub async fn list_offered(&self, driver_id: EntityId) -> PortResult<Vec<Ride>> {
        self.store.list_rides_by_driver(driver_id).await
    }

    /// Takes a ride off the market. Absent rides are a no-op.
    pub async fn mark_unavailable(&self, ride_id: EntityId) -> PortResult<()> {
        if self.store.mark_ride_unavailable(ride_id).await? {
            info!(ride_id, "Ride marked unavailable");
        } else {
            debug!(ride_id, "mark_unavailable on unknown ride ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    pub(crate) fn ride_input(from: &str, to: &str, expires_at: DateTime<Utc>) -> NewRide {
        NewRide {
            from: from.to_string(),
            to: to.to_string(),
            date: "2026-10-20".to_string(),
            time: "08:30".to_string(),
            seats: 2,
            price: 10,
            expires_at,
            accepts_parcel: false,
            car_model: Some("Corolla".to_string()),
            car_number: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn new_rides_are_available_and_owned_by_the_driver() {
        let rides = RideManager::new(Arc::new(MemoryStore::new()));
        let ride = rides
            .create_ride(7, ride_input("X", "Y", Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(ride.id, 1);
        assert_eq!(ride.driver_id, 7);
        assert!(ride.available);
    }

    #[tokio::test]
    async fn listing_hides_expired_and_unavailable_rides() {
        let rides = RideManager::new(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        let open = rides
            .create_ride(1, ride_input("A", "B", now + Duration::hours(2)))
            .await
            .unwrap();
        let expired = rides
            .create_ride(1, ride_input("C", "D", now - Duration::minutes(1)))
            .await
            .unwrap();
        let booked = rides
            .create_ride(2, ride_input("E", "F", now + Duration::hours(2)))
            .await
            .unwrap();
        rides.mark_unavailable(booked.id).await.unwrap();

        let listed = rides.list_available_rides(now).await.unwrap();
        assert_eq!(listed, vec![open.clone()]);

        // Expiry is a read-time filter only.
        let stored = rides.get_ride(expired.id).await.unwrap().unwrap();
        assert!(stored.available);

        // A ride expiring exactly now is no longer listed.
        let at_expiry = rides.list_available_rides(open.expires_at).await.unwrap();
        assert!(at_expiry.is_empty());
    }

    #[tokio::test]
    async fn mark_unavailable_is_idempotent_and_tolerates_unknown_ids() {
        let rides = RideManager::new(Arc::new(MemoryStore::new()));
        let ride = rides
            .create_ride(1, ride_input("A", "B", Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        rides.mark_unavailable(ride.id).await.unwrap();
        rides.mark_unavailable(ride.id).await.unwrap();
        rides.mark_unavailable(500).await.unwrap();
        assert!(!rides.get_ride(ride.id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn offered_rides_include_unavailable_ones() {
        let rides = RideManager::new(Arc::new(MemoryStore::new()));
        let later = Utc::now() + Duration::days(1);
        let a = rides.create_ride(3, ride_input("A", "B", later)).await.unwrap();
        rides.create_ride(4, ride_input("C", "D", later)).await.unwrap();
        rides.mark_unavailable(a.id).await.unwrap();

        let offered = rides.list_offered(3).await.unwrap();
        assert_eq!(offered.len(), 1);
        assert!(!offered[0].available);
    }
}
