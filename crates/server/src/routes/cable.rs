//! WebSocket subscription endpoint.
//!
//! Clients subscribe to a game topic (as one of the two friends) or to their
//! own status topic, and receive every event published there until they
//! unsubscribe or disconnect.

use std::collections::HashMap;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::game::PlayerId;
use crate::relationships::{RelationshipDirectory, RelationshipKey};
use crate::sync::{game_topic, status_topic};

// ---- Message types ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CommandKind {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ChannelKind {
    Game,
    Status,
}

/// Client → Server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientCommand {
    command: CommandKind,
    channel: ChannelKind,
    relationship_id: Option<i64>,
    user_id: Option<PlayerId>,
}

/// Server → Client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    ConfirmSubscription { topic: String },
    RejectSubscription { reason: String },
    Unsubscribed { topic: String },
    Message { topic: String, message: JsonValue },
    Error { message: String },
}

// ---- WebSocket handler ----

/// GET /cable
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    user: AuthUser,
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

async fn handle_socket(socket: WebSocket, user: AuthUser, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.config.broadcast_capacity);

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!("Failed to encode cable message: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut subscriptions: HashMap<String, JoinHandle<()>> = HashMap::new();

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(t) => t.to_string(),
            Message::Close(_) => break,
            _ => continue,
        };

        let command: ClientCommand = match serde_json::from_str(&text) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(user_id = user.id, "Invalid cable command: {e}");
                let _ = tx
                    .send(ServerMessage::Error {
                        message: format!("Invalid message: {e}"),
                    })
                    .await;
                continue;
            }
        };

        let topic = match resolve_topic(&command, user.id, state.relationships.as_ref()).await {
            Ok(topic) => topic,
            Err(reason) => {
                let _ = tx.send(ServerMessage::RejectSubscription { reason }).await;
                continue;
            }
        };

        match command.command {
            CommandKind::Subscribe => {
                if !subscriptions.contains_key(&topic) {
                    let events = state.hub.subscribe(&topic);
                    let forwarder = tokio::spawn(forward(topic.clone(), events, tx.clone()));
                    subscriptions.insert(topic.clone(), forwarder);
                }
                tracing::debug!(user_id = user.id, %topic, "subscribed");
                let _ = tx.send(ServerMessage::ConfirmSubscription { topic }).await;
            }
            CommandKind::Unsubscribe => {
                if let Some(forwarder) = subscriptions.remove(&topic) {
                    forwarder.abort();
                }
                let _ = tx.send(ServerMessage::Unsubscribed { topic }).await;
            }
        }
    }

    for (_, forwarder) in subscriptions {
        forwarder.abort();
    }
    drop(tx);
    let _ = writer.await;
}

async fn forward(
    topic: String,
    mut events: broadcast::Receiver<JsonValue>,
    tx: mpsc::Sender<ServerMessage>,
) {
    loop {
        match events.recv().await {
            Ok(message) => {
                if deliver(&tx, &topic, message) == Delivery::Closed {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(%topic, skipped, "Subscriber lagged, events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Queued,
    Dropped,
    Closed,
}

/// Queue one event for the socket writer. A slow client loses events
/// rather than growing the queue.
fn deliver(tx: &mpsc::Sender<ServerMessage>, topic: &str, message: JsonValue) -> Delivery {
    let msg = ServerMessage::Message {
        topic: topic.to_string(),
        message,
    };
    match tx.try_send(msg) {
        Ok(()) => Delivery::Queued,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(%topic, "Client queue full, event dropped");
            Delivery::Dropped
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
    }
}

/// Topic a command refers to, if `user` may listen on it.
async fn resolve_topic(
    command: &ClientCommand,
    user: PlayerId,
    relationships: &dyn RelationshipDirectory,
) -> Result<String, String> {
    match command.channel {
        ChannelKind::Game => {
            let id = command
                .relationship_id
                .ok_or_else(|| "relationshipId is required".to_string())?;
            let key = RelationshipKey::new(id);
            let members = relationships
                .members(key)
                .await
                .map_err(|e| {
                    tracing::warn!("Relationship lookup failed: {e}");
                    "relationship lookup failed".to_string()
                })?;
            match members {
                Some((a, b)) if a == user || b == user => Ok(game_topic(key)),
                _ => Err(format!("not a member of relationship {id}")),
            }
        }
        ChannelKind::Status => match command.user_id {
            Some(id) if id == user => Ok(status_topic(id)),
            Some(id) => Err(format!("cannot listen to status of user {id}")),
            None => Ok(status_topic(user)),
        },
    }
}
