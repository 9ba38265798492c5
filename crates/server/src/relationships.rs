//! Read-only view of the friendship graph. Games may only be played between
//! accepted friends, and the friendship id addresses the game's topic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::game::{PairKey, PlayerId};
use crate::store::StoreError;

/// Opaque id of a relationship. Only used to name publish topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipKey(i64);

impl RelationshipKey {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
pub trait RelationshipDirectory: Send + Sync {
    /// The accepted friendship between `a` and `b`, if any. Direction of the
    /// original request does not matter.
    async fn friendship(
        &self,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<Option<RelationshipKey>, StoreError>;

    /// Both members of an accepted relationship.
    async fn members(
        &self,
        key: RelationshipKey,
    ) -> Result<Option<(PlayerId, PlayerId)>, StoreError>;
}

#[derive(Debug, Clone, Copy)]
struct Friendship {
    pair: PairKey,
    accepted: bool,
}

#[derive(Debug, Default)]
pub struct MemoryRelationships {
    links: Mutex<HashMap<RelationshipKey, Friendship>>,
}

impl MemoryRelationships {
    pub fn new() -> Self {
        Self::default()
    }

    fn links(&self) -> MutexGuard<'_, HashMap<RelationshipKey, Friendship>> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, id: i64, a: PlayerId, b: PlayerId, accepted: bool) -> RelationshipKey {
        let key = RelationshipKey::new(id);
        self.links().insert(
            key,
            Friendship {
                pair: PairKey::new(a, b),
                accepted,
            },
        );
        key
    }

    /// Shorthand for an accepted friendship.
    pub fn befriend(&self, id: i64, a: PlayerId, b: PlayerId) -> RelationshipKey {
        self.insert(id, a, b, true)
    }
}

#[async_trait]
impl RelationshipDirectory for MemoryRelationships {
    async fn friendship(
        &self,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<Option<RelationshipKey>, StoreError> {
        let pair = PairKey::new(a, b);
        Ok(self
            .links()
            .iter()
            .filter(|(_, f)| f.accepted && f.pair == pair)
            .map(|(key, _)| *key)
            .min_by_key(|key| key.get()))
    }

    async fn members(
        &self,
        key: RelationshipKey,
    ) -> Result<Option<(PlayerId, PlayerId)>, StoreError> {
        Ok(self
            .links()
            .get(&key)
            .filter(|f| f.accepted)
            .map(|f| (f.pair.low(), f.pair.high())))
    }
}
