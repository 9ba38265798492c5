use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres URL. When unset the server keeps games and friendships in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Reject moves that leave the mover's own king attacked.
    pub check_safety: bool,
    /// Buffered events per topic, and per WebSocket connection, before slow
    /// subscribers start losing events.
    pub broadcast_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            jwt_secret: env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            check_safety: env::var("CHECK_SAFETY")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            broadcast_capacity: env::var("BROADCAST_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(256),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: "dev-secret-key-change-in-production".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            check_safety: false,
            broadcast_capacity: 256,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
