//! Friend games: one session per pair of players, moves validated by
//! `chess_core`, every change fanned out over the pair's topic.

pub mod registry;
pub mod session;

pub use registry::{GameRegistry, MoveReport, MoveRequest};
pub use session::{GameSession, MoveOutcome, SessionView};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Account id of a player. Identity itself is owned by the accounts system.
pub type PlayerId = i64;

/// Unordered pair of players. `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: PlayerId,
    high: PlayerId,
}

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> PlayerId {
        self.low
    }

    pub fn high(&self) -> PlayerId {
        self.high
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.low == player || self.high == player
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// Lifecycle of a session. Nothing moves a game to `Finished` yet; it is
/// reserved for checkmate or resignation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Finished,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            other => Err(format!("unknown game status {other:?}")),
        }
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("could not load game {game_id}: {reason}")]
    LoadFailure { game_id: i64, reason: String },

    #[error("no active game between these players")]
    UnknownPair,

    #[error("players cannot start a game against themselves")]
    SelfPair,

    #[error(transparent)]
    Store(StoreError),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StoreError> for GameError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Corrupt { id, reason } => Self::LoadFailure {
                game_id: id,
                reason,
            },
            StoreError::Missing(id) => Self::LoadFailure {
                game_id: id,
                reason: "record no longer exists".into(),
            },
            other => Self::Store(other),
        }
    }
}
