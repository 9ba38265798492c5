use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

use crate::game::{GameStatus, PairKey};
use crate::store::{GameRecord, NewGame, SessionStore, StoreError};

const COLUMNS: &str =
    "id, player1_id, player2_id, board, turn, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ChessgameRow {
    id: i64,
    player1_id: i64,
    player2_id: i64,
    board: String,
    turn: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChessgameRow> for GameRecord {
    type Error = StoreError;

    fn try_from(row: ChessgameRow) -> Result<Self, Self::Error> {
        let status: GameStatus = row.status.parse().map_err(|reason| StoreError::Corrupt {
            id: row.id,
            reason,
        })?;
        Ok(GameRecord {
            id: row.id,
            player1: row.player1_id,
            player2: row.player2_id,
            board: row.board,
            turn: row.turn,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `chessgames` table store.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert<'e, E>(executor: E, game: &NewGame) -> Result<GameRecord, StoreError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let pair = game.pair();
    let row = sqlx::query_as::<_, ChessgameRow>(&format!(
        "INSERT INTO chessgames (player1_id, player2_id, pair_low, pair_high, board, turn, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    ))
    .bind(game.player1)
    .bind(game.player2)
    .bind(pair.low())
    .bind(pair.high())
    .bind(&game.board)
    .bind(&game.turn)
    .bind(game.status.as_str())
    .fetch_one(executor)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(pair.low(), pair.high()),
        _ => StoreError::Sqlx(e),
    })?;

    row.try_into()
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, pair: PairKey) -> Result<Option<GameRecord>, StoreError> {
        let row = sqlx::query_as::<_, ChessgameRow>(&format!(
            "SELECT {COLUMNS} FROM chessgames WHERE pair_low = $1 AND pair_high = $2"
        ))
        .bind(pair.low())
        .bind(pair.high())
        .fetch_optional(&self.pool)
        .await?;

        row.map(GameRecord::try_from).transpose()
    }

    async fn save(&self, record: &GameRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE chessgames SET board = $2, turn = $3, status = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.board)
        .bind(&record.turn)
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(record.id));
        }
        Ok(())
    }

    async fn create(&self, game: NewGame) -> Result<GameRecord, StoreError> {
        insert(&self.pool, &game).await
    }

    async fn delete(&self, pair: PairKey) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM chessgames WHERE pair_low = $1 AND pair_high = $2")
            .bind(pair.low())
            .bind(pair.high())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace(&self, game: NewGame) -> Result<GameRecord, StoreError> {
        let pair = game.pair();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chessgames WHERE pair_low = $1 AND pair_high = $2")
            .bind(pair.low())
            .bind(pair.high())
            .execute(&mut *tx)
            .await?;
        let record = insert(&mut *tx, &game).await?;

        tx.commit().await?;
        Ok(record)
    }
}
