//! Shared state and the HTTP router.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::game::GameRegistry;
use crate::relationships::RelationshipDirectory;
use crate::routes;
use crate::store::SessionStore;
use crate::sync::BroadcastHub;
use chess_core::MoveValidator;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<GameRegistry>,
    pub relationships: Arc<dyn RelationshipDirectory>,
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        relationships: Arc<dyn RelationshipDirectory>,
    ) -> Self {
        let hub = Arc::new(BroadcastHub::new(config.broadcast_capacity));
        let validator = MoveValidator::with_check_safety(config.check_safety);
        let registry = Arc::new(GameRegistry::new(store, hub.clone(), validator));
        Self {
            config,
            registry,
            relationships,
            hub,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Games, specific routes before parameterized
        .route("/api/chessgames", post(routes::chessgames::create_game))
        .route("/api/chessgames/move", put(routes::chessgames::make_move))
        .route("/api/chessgames/{friend_id}", get(routes::chessgames::show_game))
        // Subscriptions
        .route("/cable", get(routes::cable::ws_handler))
        // Shared state
        .layer(Extension(state.config.clone()))
        .layer(Extension(state))
        .layer(cors)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
