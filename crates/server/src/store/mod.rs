//! Persistence seam for game records.
//!
//! The core only needs to load, save and destroy a record by pair key. The
//! Postgres implementation lives in `db::chessgames`; [`MemoryStore`] backs
//! local runs and tests.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::game::{GameStatus, PairKey, PlayerId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game record {0} does not exist")]
    Missing(i64),

    #[error("players {0} and {1} already have a game")]
    Conflict(PlayerId, PlayerId),

    #[error("game record {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persisted form of a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: i64,
    /// Plays white; the player who asked for the game.
    pub player1: PlayerId,
    /// Plays black.
    pub player2: PlayerId,
    /// FEN piece placement.
    pub board: String,
    /// `"w"` or `"b"`.
    pub turn: String,
    pub status: GameStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.player1, self.player2)
    }
}

/// A record about to be inserted; the store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub board: String,
    pub turn: String,
    pub status: GameStatus,
}

impl NewGame {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.player1, self.player2)
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, pair: PairKey) -> Result<Option<GameRecord>, StoreError>;

    /// Write back board, turn and status of an existing record.
    async fn save(&self, record: &GameRecord) -> Result<(), StoreError>;

    async fn create(&self, game: NewGame) -> Result<GameRecord, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, pair: PairKey) -> Result<bool, StoreError>;

    /// Destroy whatever record the pair has and insert `game` in its place.
    /// Implementations that can should do both in one transaction.
    async fn replace(&self, game: NewGame) -> Result<GameRecord, StoreError> {
        self.delete(game.pair()).await?;
        self.create(game).await
    }
}
