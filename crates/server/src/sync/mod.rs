//! Topic-based fan-out of game events.

pub mod hub;

pub use hub::BroadcastHub;

use chess_core::StateSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::game::PlayerId;
use crate::relationships::RelationshipKey;

/// Fire-and-forget delivery to whoever listens on `topic`. No acknowledgment
/// and no error back to the caller.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, message: JsonValue);
}

/// Payload published on a game topic after a start/reset or a move attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEvent {
    pub new_game: bool,
    /// Submitted `[start, end, promotion]`, exactly as the client sent them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_info: Option<(String, String, Option<String>)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_data: Option<StateSnapshot>,
}

impl SyncEvent {
    pub fn new_game() -> Self {
        Self {
            new_game: true,
            move_info: None,
            player_data: None,
        }
    }

    pub fn move_attempt(
        start: &str,
        end: &str,
        promotion: Option<&str>,
        snapshot: StateSnapshot,
    ) -> Self {
        Self {
            new_game: false,
            move_info: Some((start.to_string(), end.to_string(), promotion.map(str::to_string))),
            player_data: Some(snapshot),
        }
    }
}

/// Sent to a player's status topic when a friend starts or resets their game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInvite {
    pub game_id: i64,
    pub from: PlayerId,
    pub relationship_id: RelationshipKey,
}

pub fn game_topic(relationship: RelationshipKey) -> String {
    format!("game_{}_channel", relationship.get())
}

pub fn status_topic(player: PlayerId) -> String {
    format!("status_{player}_channel")
}
