use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::game::{GameError, MoveReport, MoveRequest, PlayerId, SessionView};
use crate::relationships::RelationshipKey;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameBody {
    pub friend_id: PlayerId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBody {
    pub friend_id: PlayerId,
    pub start_pos: String,
    pub new_pos: String,
    #[serde(default)]
    pub promotion: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    #[serde(flatten)]
    pub game: SessionView,
    pub relationship_id: RelationshipKey,
}

async fn friendship(
    state: &AppState,
    user: PlayerId,
    friend: PlayerId,
) -> Result<RelationshipKey, AppError> {
    state
        .relationships
        .friendship(user, friend)
        .await?
        .ok_or_else(|| AppError::from(GameError::UnknownPair))
}

/// POST /api/chessgames
///
/// Starts a game with the friend, destroying any game the two already have.
pub async fn create_game(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(body): Json<CreateGameBody>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    if body.friend_id == user.id {
        return Err(GameError::SelfPair.into());
    }
    let relationship = friendship(&state, user.id, body.friend_id).await?;
    let session = state
        .registry
        .start_or_reset(user.id, body.friend_id, relationship)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GameResponse {
            game: session.view(),
            relationship_id: relationship,
        }),
    ))
}

/// PUT /api/chessgames/move
///
/// Illegal moves are not errors: the response says `applied: false` and the
/// unchanged board is published to both players.
pub async fn make_move(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(body): Json<MoveBody>,
) -> Result<Json<MoveReport>, AppError> {
    let relationship = friendship(&state, user.id, body.friend_id).await?;
    let request = MoveRequest {
        start: body.start_pos,
        end: body.new_pos,
        promotion: body.promotion,
    };
    let report = state
        .registry
        .submit_move(user.id, body.friend_id, relationship, &request)
        .await?;
    Ok(Json(report))
}

/// GET /api/chessgames/{friend_id}
pub async fn show_game(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(friend_id): Path<PlayerId>,
) -> Result<Json<GameResponse>, AppError> {
    let relationship = friendship(&state, user.id, friend_id).await?;
    let session = state
        .registry
        .game_between(user.id, friend_id)
        .await?
        .ok_or(GameError::UnknownPair)?;

    Ok(Json(GameResponse {
        game: session.view(),
        relationship_id: relationship,
    }))
}
