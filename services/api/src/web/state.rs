//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the identity attached to
//! authenticated requests.

use crate::adapters::push::PushHub;
use crate::config::Config;
use ride_share_core::domain::EntityId;
use ride_share_core::ports::EntityStore;
use ride_share_core::{BookingManager, NotificationFanout, RideManager};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<Config>,
    pub push_hub: Arc<PushHub>,
    pub rides: RideManager,
    pub bookings: BookingManager,
    pub notifications: NotificationFanout,
}

impl AppState {
    /// Wires the lifecycle components over one store and one push hub.
    pub fn new(store: Arc<dyn EntityStore>, push_hub: Arc<PushHub>, config: Arc<Config>) -> Self {
        let rides = RideManager::new(store.clone());
        let notifications = NotificationFanout::new(store.clone(), push_hub.clone());
        let bookings = BookingManager::new(store.clone(), rides.clone(), notifications.clone());
        Self {
            store,
            config,
            push_hub,
            rides,
            bookings,
            notifications,
        }
    }
}

/// The user behind an authenticated request, inserted by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub EntityId);
