use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::auth::jwt;
use crate::config::Config;
use crate::error::AppError;
use crate::game::PlayerId;

/// Player identity taken from a bearer token.
///
/// Browsers cannot set headers on a WebSocket handshake, so a `token` query
/// parameter is accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: PlayerId,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<Config>()
            .ok_or(AppError::Internal("Missing config".into()))?;

        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or(AppError::Unauthorized)?;

        let id = jwt::verify(&token, &config.jwt_secret).ok_or(AppError::Unauthorized)?;

        Ok(AuthUser { id })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get("authorization")?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::to_string)
}

fn query_token(parts: &Parts) -> Option<String> {
    let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).ok()?;
    params.remove("token").filter(|t| !t.is_empty())
}
