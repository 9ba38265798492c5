use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chess_core::{Move, MoveValidator, StateSnapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

use super::{GameError, GameSession, PairKey, PlayerId};
use crate::relationships::RelationshipKey;
use crate::store::SessionStore;
use crate::sync::{game_topic, status_topic, GameInvite, Publisher, SyncEvent};

/// A move as submitted by a client. Squares are raw text so that malformed
/// input can still be echoed back in the published event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveRequest {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub promotion: Option<String>,
}

impl MoveRequest {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            promotion: None,
        }
    }

    pub fn promote(mut self, kind: &str) -> Self {
        self.promotion = Some(kind.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub player_data: StateSnapshot,
}

/// Owns the pair-to-session mapping and serializes all work on one pair.
pub struct GameRegistry {
    store: Arc<dyn SessionStore>,
    publisher: Arc<dyn Publisher>,
    validator: MoveValidator,
    locks: Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>,
}

impl GameRegistry {
    pub fn new(
        store: Arc<dyn SessionStore>,
        publisher: Arc<dyn Publisher>,
        validator: MoveValidator,
    ) -> Self {
        Self {
            store,
            publisher,
            validator,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, pair: PairKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|key, lock| *key == pair || Arc::strong_count(lock) > 1);
        locks.entry(pair).or_default().clone()
    }

    fn open(&self, record: crate::store::GameRecord) -> Result<GameSession, GameError> {
        GameSession::open(record, self.validator, self.store.clone())
    }

    /// The session for `{a, b}`, whichever order the players are given in.
    pub async fn game_between(
        &self,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<Option<GameSession>, GameError> {
        match self.store.load(PairKey::new(a, b)).await? {
            Some(record) => self.open(record).map(Some),
            None => Ok(None),
        }
    }

    /// Destroy any game between the two players and start a fresh one with
    /// `requester` as white.
    pub async fn start_or_reset(
        &self,
        requester: PlayerId,
        friend: PlayerId,
        relationship: RelationshipKey,
    ) -> Result<GameSession, GameError> {
        if requester == friend {
            return Err(GameError::SelfPair);
        }
        let pair = PairKey::new(requester, friend);
        let lock = self.lock_for(pair);
        let _guard = lock.lock().await;

        let record = self
            .store
            .replace(GameSession::initial(requester, friend))
            .await?;
        let session = self.open(record)?;
        tracing::info!(game_id = session.id(), %pair, %relationship, "game started");

        self.publisher.publish(
            &game_topic(relationship),
            serde_json::to_value(SyncEvent::new_game())?,
        );
        let invite = GameInvite {
            game_id: session.id(),
            from: requester,
            relationship_id: relationship,
        };
        self.publisher
            .publish(&status_topic(friend), serde_json::to_value(invite)?);

        Ok(session)
    }

    /// Load, validate, apply, persist and publish one move attempt while
    /// holding the pair's lock. Rejected moves are still published.
    pub async fn submit_move(
        &self,
        requester: PlayerId,
        friend: PlayerId,
        relationship: RelationshipKey,
        request: &MoveRequest,
    ) -> Result<MoveReport, GameError> {
        let pair = PairKey::new(requester, friend);
        let lock = self.lock_for(pair);
        let _guard = lock.lock().await;

        let record = self.store.load(pair).await?.ok_or(GameError::UnknownPair)?;
        let mut session = self.open(record)?;
        let color = session.color_of(requester).ok_or(GameError::UnknownPair)?;

        let (applied, rejection) =
            match Move::parse(&request.start, &request.end, request.promotion.as_deref()) {
                Ok(mv) => {
                    let outcome = session.attempt_move(color, &mv).await?;
                    (outcome.applied, outcome.rejection.map(|r| r.to_string()))
                }
                Err(e) => {
                    tracing::debug!(game_id = session.id(), error = %e, "unreadable move");
                    (false, Some(e.to_string()))
                }
            };

        let player_data = session.serialize_state();
        let event = SyncEvent::move_attempt(
            &request.start,
            &request.end,
            request.promotion.as_deref(),
            player_data.clone(),
        );
        self.publisher
            .publish(&game_topic(relationship), serde_json::to_value(event)?);

        Ok(MoveReport {
            applied,
            rejection,
            player_data,
        })
    }
}
