use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{GameRecord, NewGame, SessionStore, StoreError};
use crate::game::PairKey;

/// In-process store keyed by pair.
#[derive(Debug)]
pub struct MemoryStore {
    games: Mutex<HashMap<PairKey, GameRecord>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn games(&self) -> MutexGuard<'_, HashMap<PairKey, GameRecord>> {
        self.games.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite a record as-is, bypassing validation. Used to seed positions
    /// and to simulate damaged rows.
    pub fn put(&self, record: GameRecord) {
        self.next_id.fetch_max(record.id + 1, Ordering::Relaxed);
        self.games().insert(record.pair(), record);
    }

    fn build(&self, game: NewGame) -> GameRecord {
        let now = Utc::now();
        GameRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            player1: game.player1,
            player2: game.player2,
            board: game.board,
            turn: game.turn,
            status: game.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.games().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, pair: PairKey) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.games().get(&pair).cloned())
    }

    async fn save(&self, record: &GameRecord) -> Result<(), StoreError> {
        let mut games = self.games();
        match games.get_mut(&record.pair()) {
            Some(existing) if existing.id == record.id => {
                existing.board = record.board.clone();
                existing.turn = record.turn.clone();
                existing.status = record.status;
                existing.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(StoreError::Missing(record.id)),
        }
    }

    async fn create(&self, game: NewGame) -> Result<GameRecord, StoreError> {
        let pair = game.pair();
        let mut games = self.games();
        if games.contains_key(&pair) {
            return Err(StoreError::Conflict(pair.low(), pair.high()));
        }
        let record = self.build(game);
        games.insert(pair, record.clone());
        Ok(record)
    }

    async fn delete(&self, pair: PairKey) -> Result<bool, StoreError> {
        Ok(self.games().remove(&pair).is_some())
    }

    async fn replace(&self, game: NewGame) -> Result<GameRecord, StoreError> {
        // Single insert under one lock, so no reader sees the pair without a record.
        let record = self.build(game);
        self.games().insert(record.pair(), record.clone());
        Ok(record)
    }
}
