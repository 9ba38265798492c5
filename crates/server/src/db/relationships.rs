use async_trait::async_trait;
use sqlx::PgPool;

use crate::game::PlayerId;
use crate::relationships::{RelationshipDirectory, RelationshipKey};
use crate::store::StoreError;

/// Reads accepted friendships from the `relationships` table.
#[derive(Debug, Clone)]
pub struct PgRelationships {
    pool: PgPool,
}

impl PgRelationships {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipDirectory for PgRelationships {
    async fn friendship(
        &self,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<Option<RelationshipKey>, StoreError> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"SELECT id FROM relationships
            WHERE accepted
              AND ((friend_active_id = $1 AND friend_pasive_id = $2)
                OR (friend_active_id = $2 AND friend_pasive_id = $1))
            ORDER BY id
            LIMIT 1"#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.map(RelationshipKey::new))
    }

    async fn members(
        &self,
        key: RelationshipKey,
    ) -> Result<Option<(PlayerId, PlayerId)>, StoreError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT friend_active_id, friend_pasive_id FROM relationships WHERE id = $1 AND accepted",
        )
        .bind(key.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
