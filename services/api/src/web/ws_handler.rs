//! services/api/src/web/ws_handler.rs
//!
//! The live notification feed. Each connection subscribes to the caller's
//! push topic and receives the full set of pushed records on connect and on
//! every change.

use crate::adapters::push::{Feed, PushHub};
use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, CurrentUser},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use ride_share_core::domain::EntityId;
use std::sync::Arc;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{error, info, warn};

/// GET /api/notifications/live - Upgrades to the live notification feed
pub async fn live_notifications_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, user_id))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, user_id: EntityId) {
    info!(user_id, "Live notification feed connected");

    let (mut sender, mut receiver) = socket.split();
    let (initial, mut updates) = app_state.push_hub.subscribe(user_id).await;

    // --- 1. Initial snapshot ---
    if send_message(&mut sender, &ServerMessage::snapshot(&initial))
        .await
        .is_err()
    {
        info!(user_id, "Client went away before the first snapshot");
        return;
    }

    // --- 2. Main loop ---
    loop {
        tokio::select! {
            update = updates.recv() => {
                let message = match update {
                    Ok(feed) => ServerMessage::snapshot(&feed),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(user_id, skipped, "Live feed lagged, resending current snapshot");
                        ServerMessage::snapshot(
                            &catch_up(&mut updates, &app_state.push_hub, user_id).await,
                        )
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_message(&mut sender, &message).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Refresh) => {
                                ServerMessage::snapshot(&app_state.push_hub.snapshot(user_id).await)
                            }
                            Err(e) => {
                                warn!(user_id, "Failed to deserialize client message: {}", e);
                                ServerMessage::Error {
                                    message: "Unrecognised message".to_string(),
                                }
                            }
                        };
                        if send_message(&mut sender, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(user_id, "WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!(user_id, "Live notification feed closed");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ()> {
    let json = serde_json::to_string(message).map_err(|e| {
        error!("Failed to serialize server message: {}", e);
    })?;
    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| info!("WebSocket send failed: {}", e))
}

/// Discards feeds still buffered after a lag and returns the current one.
///
/// Snapshots are complete, so the latest covers everything skipped. Buffered
/// feeds are older than it and would briefly shrink the client's list.
async fn catch_up(
    updates: &mut broadcast::Receiver<Feed>,
    hub: &PushHub,
    user_id: EntityId,
) -> Feed {
    loop {
        match updates.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    hub.snapshot(user_id).await
}
