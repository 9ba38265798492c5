use std::sync::Arc;

use chess_core::piece::parse_color;
use chess_core::{apply, Board, Color, Move, MoveValidator, Rejection, Side, StateSnapshot};
use serde::Serialize;

use super::{GameError, GameStatus, PairKey, PlayerId};
use crate::store::{GameRecord, NewGame, SessionStore};

/// Result of one move attempt. `board` is the position after the attempt,
/// which is the untouched position when `applied` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub applied: bool,
    pub board: Board,
    pub rejection: Option<Rejection>,
}

/// What clients see when they open or reset a game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: i64,
    pub white: PlayerId,
    pub black: PlayerId,
    pub status: GameStatus,
    pub player_data: StateSnapshot,
}

/// A loaded game between two players.
///
/// Sessions are short-lived views over the stored record: the registry opens
/// one per request while holding the pair's lock, and every applied move is
/// written back before the call returns.
pub struct GameSession {
    record: GameRecord,
    board: Board,
    validator: MoveValidator,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("record", &self.record)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl PartialEq for GameSession {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.board == other.board
    }
}

impl GameSession {
    /// Wrap a stored record, parsing its board.
    pub fn open(
        record: GameRecord,
        validator: MoveValidator,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, GameError> {
        let board = decode_board(&record)?;
        Ok(Self {
            record,
            board,
            validator,
            store,
        })
    }

    /// Fresh record contents for a pair: standard position, white to move.
    pub fn initial(white: PlayerId, black: PlayerId) -> NewGame {
        let (board, turn) = encode_board(&Board::standard());
        NewGame {
            player1: white,
            player2: black,
            board,
            turn,
            status: GameStatus::Active,
        }
    }

    /// Re-read board and turn from the store.
    pub async fn load_board(&mut self) -> Result<&Board, GameError> {
        let record = self
            .store
            .load(self.pair())
            .await?
            .filter(|r| r.id == self.record.id)
            .ok_or_else(|| GameError::LoadFailure {
                game_id: self.record.id,
                reason: "record is missing".into(),
            })?;

        self.board = decode_board(&record)?;
        self.record = record;
        Ok(&self.board)
    }

    /// Validate `mv` for `moving` and, when legal, apply and persist it.
    pub async fn attempt_move(
        &mut self,
        moving: Color,
        mv: &Move,
    ) -> Result<MoveOutcome, GameError> {
        if let Err(rejection) = self.validator.check(&self.board, moving, mv) {
            tracing::debug!(game_id = self.record.id, %mv, %rejection, "move rejected");
            return Ok(MoveOutcome {
                applied: false,
                board: self.board.clone(),
                rejection: Some(rejection),
            });
        }

        let next = apply(&self.board, mv);
        self.persist(next).await?;
        tracing::debug!(game_id = self.record.id, %mv, "move applied");

        Ok(MoveOutcome {
            applied: true,
            board: self.board.clone(),
            rejection: None,
        })
    }

    /// Standard position, white to move, status active. Keeps the record id.
    pub async fn reset(&mut self) -> Result<(), GameError> {
        self.record.status = GameStatus::Active;
        self.persist(Board::standard()).await
    }

    async fn persist(&mut self, board: Board) -> Result<(), GameError> {
        let mut record = self.record.clone();
        (record.board, record.turn) = encode_board(&board);
        self.store.save(&record).await?;
        self.record = record;
        self.board = board;
        Ok(())
    }

    pub fn serialize_state(&self) -> StateSnapshot {
        StateSnapshot::of(&self.board)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.record.id,
            white: self.record.player1,
            black: self.record.player2,
            status: self.record.status,
            player_data: self.serialize_state(),
        }
    }

    /// player1 plays white, player2 black.
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if player == self.record.player1 {
            Some(Color::White)
        } else if player == self.record.player2 {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }

    pub fn pair(&self) -> PairKey {
        self.record.pair()
    }

    pub fn status(&self) -> GameStatus {
        self.record.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }
}

fn encode_board(board: &Board) -> (String, String) {
    let turn = match Side::from(board.turn()) {
        Side::White => "w",
        Side::Black => "b",
    };
    (board.to_placement(), turn.to_string())
}

fn decode_board(record: &GameRecord) -> Result<Board, GameError> {
    let failure = |reason: String| GameError::LoadFailure {
        game_id: record.id,
        reason,
    };

    if record.board.trim().is_empty() {
        return Err(failure("board is empty".into()));
    }
    let turn = parse_color(&record.turn).map_err(|e| failure(e.to_string()))?;
    Board::from_placement(&record.board, turn).map_err(|e| failure(e.to_string()))
}
