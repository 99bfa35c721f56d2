//! crates/ride_share_core/src/notifications.rs
//!
//! Notification fan-out: records a notification for a recipient and mirrors it
//! to the push channel.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{EntityId, NewNotification, Notification, NotificationKind, PushRecord};
use crate::ports::{EntityStore, PortResult, PushChannel};

/// What a caller wants delivered; the timestamp and read flag are filled in here.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub recipient: EntityId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_ride_id: Option<EntityId>,
    pub related_booking_id: Option<EntityId>,
}

#[derive(Clone)]
pub struct NotificationFanout {
    store: Arc<dyn EntityStore>,
    push: Arc<dyn PushChannel>,
}

impl NotificationFanout {
    pub fn new(store: Arc<dyn EntityStore>, push: Arc<dyn PushChannel>) -> Self {
        Self { store, push }
    }

    /// Stores an unread notification, then mirrors it to the push channel.
    ///
    /// The stored record is the result. A push failure is logged and dropped.
    pub async fn notify(&self, draft: NotificationDraft) -> PortResult<Notification> {
        let notification = self
            .store
            .create_notification(NewNotification {
                user_id: draft.recipient,
                title: draft.title,
                message: draft.message,
                kind: draft.kind,
                created_at: Utc::now(),
                related_ride_id: draft.related_ride_id,
                related_booking_id: draft.related_booking_id,
            })
            .await?;
        info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            kind = notification.kind.as_str(),
            "Notification recorded"
        );

        match self
            .push
            .publish(notification.user_id, PushRecord::from(&notification))
            .await
        {
            Ok(key) => debug!(notification_id = notification.id, %key, "Notification pushed"),
            Err(e) => warn!(
                notification_id = notification.id,
                "Push mirror failed, notification still stored: {}", e
            ),
        }

        Ok(notification)
    }

    /// The user's notifications, most recent first.
    pub async fn list_for_user(&self, user_id: EntityId) -> PortResult<Vec<Notification>> {
        let mut notifications = self.store.list_notifications_by_user(user_id).await?;
        notifications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notifications)
    }

    /// Marks a notification read. Unknown ids are ignored.
    pub async fn mark_read(&self, notification_id: EntityId) -> PortResult<()> {
        if !self.store.mark_notification_read(notification_id).await? {
            debug!(notification_id, "mark_read on unknown notification ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::PortError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Push channel that remembers what it was given.
    #[derive(Default)]
    pub(crate) struct RecordingPush {
        pub(crate) published: Mutex<Vec<(EntityId, PushRecord)>>,
    }

    #[async_trait]
    impl PushChannel for RecordingPush {
        async fn publish(&self, user_id: EntityId, record: PushRecord) -> PortResult<String> {
            let mut published = self.published.lock().await;
            published.push((user_id, record));
            Ok(format!("key-{}", published.len()))
        }
    }

    struct BrokenPush;

    #[async_trait]
    impl PushChannel for BrokenPush {
        async fn publish(&self, _user_id: EntityId, _record: PushRecord) -> PortResult<String> {
            Err(PortError::Unexpected("transport down".to_string()))
        }
    }

    fn draft(recipient: EntityId, title: &str) -> NotificationDraft {
        NotificationDraft {
            recipient,
            title: title.to_string(),
            message: "hello".to_string(),
            kind: NotificationKind::System,
            related_ride_id: None,
            related_booking_id: None,
        }
    }

    #[tokio::test]
    async fn notify_stores_unread_and_mirrors() {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(RecordingPush::default());
        let fanout = NotificationFanout::new(store.clone(), push.clone());

        let n = fanout.notify(draft(4, "Hi")).await.unwrap();
        assert_eq!(n.id, 1);
        assert!(!n.read);

        let published = push.published.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, 4);
        assert_eq!(published[0].1.title, "Hi");
    }

    #[tokio::test]
    async fn push_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        let fanout = NotificationFanout::new(store.clone(), Arc::new(BrokenPush));

        let n = fanout.notify(draft(1, "Still here")).await.unwrap();
        let listed = fanout.list_for_user(1).await.unwrap();
        assert_eq!(listed, vec![n]);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let fanout = NotificationFanout::new(store, Arc::new(RecordingPush::default()));
        for title in ["first", "second", "third"] {
            fanout.notify(draft(9, title)).await.unwrap();
        }
        fanout.notify(draft(10, "someone else")).await.unwrap();

        let listed = fanout.list_for_user(9).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let fanout = NotificationFanout::new(store, Arc::new(RecordingPush::default()));
        let n = fanout.notify(draft(2, "ping")).await.unwrap();

        fanout.mark_read(n.id).await.unwrap();
        fanout.mark_read(n.id).await.unwrap();
        fanout.mark_read(404).await.unwrap();

        let listed = fanout.list_for_user(2).await.unwrap();
        assert!(listed[0].read);
    }
}
