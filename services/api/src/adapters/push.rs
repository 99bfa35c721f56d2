//! services/api/src/adapters/push.rs
//!
//! The in-process push channel. It implements the `PushChannel` port from the
//! core crate as a keyed publish/subscribe store: each recipient has an
//! append-only set of individually keyed records and a broadcast channel that
//! carries the full set to subscribers whenever it changes.

use async_trait::async_trait;
use ride_share_core::domain::{EntityId, PushRecord};
use ride_share_core::ports::{PortResult, PushChannel};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

/// A record as stored under a recipient, with the key the hub assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PushedNotification {
    pub key: String,
    pub record: PushRecord,
}

/// Everything currently published for one recipient, in publish order.
pub type Feed = Arc<Vec<PushedNotification>>;

struct Topic {
    records: Vec<PushedNotification>,
    sender: broadcast::Sender<Feed>,
}

impl Topic {
    fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            sender: broadcast::channel(capacity).0,
        }
    }

    fn feed(&self) -> Feed {
        Arc::new(self.records.clone())
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Per-recipient topics, created lazily on first publish or subscribe.
pub struct PushHub {
    topics: RwLock<HashMap<EntityId, Topic>>,
    capacity: usize,
}

impl PushHub {
    /// Creates a hub whose per-recipient channels buffer `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Returns the recipient's current feed and a receiver for later changes.
    pub async fn subscribe(&self, user_id: EntityId) -> (Feed, broadcast::Receiver<Feed>) {
        let mut topics = self.topics.write().await;
        let topic = topics
            .entry(user_id)
            .or_insert_with(|| Topic::new(self.capacity));
        (topic.feed(), topic.sender.subscribe())
    }

    /// The recipient's current feed.
    pub async fn snapshot(&self, user_id: EntityId) -> Feed {
        let topics = self.topics.read().await;
        topics
            .get(&user_id)
            .map(Topic::feed)
            .unwrap_or_default()
    }
}

//=========================================================================================
// `PushChannel` Trait Implementation
//=========================================================================================

#[async_trait]
impl PushChannel for PushHub {
    async fn publish(&self, user_id: EntityId, record: PushRecord) -> PortResult<String> {
        let key = Uuid::new_v4().to_string();
        let mut topics = self.topics.write().await;
        let topic = topics
            .entry(user_id)
            .or_insert_with(|| Topic::new(self.capacity));
        topic.records.push(PushedNotification {
            key: key.clone(),
            record,
        });

        // No subscribers is the common case and not an error.
        let delivered = topic.sender.send(topic.feed()).unwrap_or(0);
        debug!(user_id, %key, delivered, "Push record published");
        Ok(key)
    }
}
