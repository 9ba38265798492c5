#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde_json::Value;
use server::app::{self, AppState};
use server::auth::jwt::Claims;
use server::config::Config;
use server::game::PairKey;
use server::relationships::MemoryRelationships;
use server::store::{GameRecord, MemoryStore, SessionStore};
use tokio::sync::broadcast;

/// A server running in-process on an ephemeral port, backed by memory stores.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub relationships: Arc<MemoryRelationships>,
    client: Client,
}

pub async fn spawn() -> TestApp {
    spawn_with(Config::default()).await
}

pub async fn spawn_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let relationships = Arc::new(MemoryRelationships::new());
    let state = AppState::new(config, store.clone(), relationships.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(app::serve(listener, state.clone()));

    TestApp {
        addr,
        state,
        store,
        relationships,
        client: Client::new(),
    }
}

impl TestApp {
    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Sign a token the way the accounts service does.
    pub fn token(&self, user_id: i64) -> String {
        let claims = Claims {
            user_id,
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.state.config.jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn create_game(&self, user: i64, friend: i64) -> reqwest::Response {
        self.client
            .post(self.url("/api/chessgames"))
            .bearer_auth(self.token(user))
            .json(&serde_json::json!({ "friendId": friend }))
            .send()
            .await
            .expect("Failed to send create request")
    }

    pub async fn make_move(&self, user: i64, body: Value) -> reqwest::Response {
        self.client
            .put(self.url("/api/chessgames/move"))
            .bearer_auth(self.token(user))
            .json(&body)
            .send()
            .await
            .expect("Failed to send move request")
    }

    pub async fn show_game(&self, user: i64, friend: i64) -> reqwest::Response {
        self.client
            .get(self.url(&format!("/api/chessgames/{friend}")))
            .bearer_auth(self.token(user))
            .send()
            .await
            .expect("Failed to send show request")
    }

    /// The stored record for a pair, which must exist.
    pub async fn store_record(&self, a: i64, b: i64) -> GameRecord {
        self.store
            .load(PairKey::new(a, b))
            .await
            .unwrap()
            .expect("no game stored for pair")
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Value> {
        self.state.hub.subscribe(topic)
    }
}

/// Next event on a subscription, failing the test if none arrives promptly.
pub async fn next_event(events: &mut broadcast::Receiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("subscription closed")
}
