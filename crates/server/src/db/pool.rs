use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Apply the schema inline. Every statement is idempotent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Friendships, written by the accounts side of the app. friend_active_id sent
-- the request, friend_pasive_id received it.
CREATE TABLE IF NOT EXISTS relationships (
    id               BIGSERIAL PRIMARY KEY,
    friend_active_id BIGINT NOT NULL,
    friend_pasive_id BIGINT NOT NULL,
    accepted         BOOLEAN NOT NULL DEFAULT FALSE,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_relationships_active
    ON relationships (friend_active_id);
CREATE INDEX IF NOT EXISTS idx_relationships_pasive
    ON relationships (friend_pasive_id);

-- One game per unordered pair of players. player1 plays white.
CREATE TABLE IF NOT EXISTS chessgames (
    id          BIGSERIAL PRIMARY KEY,
    player1_id  BIGINT NOT NULL,
    player2_id  BIGINT NOT NULL,
    pair_low    BIGINT NOT NULL,
    pair_high   BIGINT NOT NULL,
    board       TEXT NOT NULL,
    turn        TEXT NOT NULL DEFAULT 'w',
    status      TEXT NOT NULL DEFAULT 'active',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (pair_low, pair_high),
    CHECK (pair_low = LEAST(player1_id, player2_id)),
    CHECK (pair_high = GREATEST(player1_id, player2_id))
);
"#;
