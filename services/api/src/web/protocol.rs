//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol for the live notification feed.

use serde::{Deserialize, Serialize};

use crate::adapters::push::Feed;
use crate::web::dto::PushNotificationPayload;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Asks the server to send the current snapshot again.
    Refresh,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full set of records pushed to this user, oldest first.
    /// Sent on connect and again whenever the set changes.
    Snapshot {
        notifications: Vec<PushNotificationPayload>,
    },

    /// Reports a problem with a client message.
    Error { message: String },
}

impl ServerMessage {
    pub fn snapshot(feed: &Feed) -> Self {
        ServerMessage::Snapshot {
            notifications: feed.iter().map(PushNotificationPayload::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::push::PushedNotification;
    use chrono::Utc;
    use ride_share_core::domain::{NotificationKind, PushRecord};
    use std::sync::Arc;

    #[test]
    fn snapshot_serializes_with_type_tag() {
        let feed: Feed = Arc::new(vec![PushedNotification {
            key: "k-1".to_string(),
            record: PushRecord {
                user_id: 7,
                title: "New Ride Request".to_string(),
                message: "Sam wants to book your ride from A to B".to_string(),
                kind: NotificationKind::RideRequest,
                created_at: Utc::now(),
                related_ride_id: Some(3),
                related_booking_id: Some(4),
            },
        }]);

        let json = serde_json::to_value(ServerMessage::snapshot(&feed)).unwrap();
        assert_eq!(json["type"], "snapshot");
        let first = &json["notifications"][0];
        assert_eq!(first["id"], "k-1");
        assert_eq!(first["type"], "ride_request");
        assert_eq!(first["read"], false);
        assert_eq!(first["relatedBookingId"], 4);
    }

    #[test]
    fn refresh_parses() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"refresh"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Refresh);
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"init"}"#).is_err());
    }
}
