use std::sync::Arc;

use anyhow::Context;
use server::app::{self, AppState};
use server::config::Config;
use server::db;
use server::relationships::{MemoryRelationships, RelationshipDirectory};
use server::store::{MemoryStore, SessionStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let (store, relationships): (Arc<dyn SessionStore>, Arc<dyn RelationshipDirectory>) =
        match &config.database_url {
            Some(url) => {
                tracing::info!("Connecting to database...");
                let pool = db::pool::create_pool(url)
                    .await
                    .context("Failed to connect to database")?;

                tracing::info!("Running migrations...");
                db::pool::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;

                (
                    Arc::new(db::PgSessionStore::new(pool.clone())),
                    Arc::new(db::PgRelationships::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set - games and friendships are kept in memory");
                (
                    Arc::new(MemoryStore::new()),
                    Arc::new(MemoryRelationships::new()),
                )
            }
        };

    if config.check_safety {
        tracing::info!("Check-safety enabled");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, store, relationships);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    app::serve(listener, state).await.context("Server error")
}
