//! Wire representation of a board for remote redraw.

use serde::{Deserialize, Serialize};
use shakmaty::{Color, Role};

use crate::board::Board;
use crate::error::BoardError;
use crate::piece::piece;
use crate::square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(c: Color) -> Self {
        match c {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(s: Side) -> Self {
        match s {
            Side::White => Self::White,
            Side::Black => Self::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl From<Role> for Kind {
    fn from(r: Role) -> Self {
        match r {
            Role::Pawn => Self::Pawn,
            Role::Knight => Self::Knight,
            Role::Bishop => Self::Bishop,
            Role::Rook => Self::Rook,
            Role::Queen => Self::Queen,
            Role::King => Self::King,
        }
    }
}

impl From<Kind> for Role {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Pawn => Self::Pawn,
            Kind::Knight => Self::Knight,
            Kind::Bishop => Self::Bishop,
            Kind::Rook => Self::Rook,
            Kind::Queen => Self::Queen,
            Kind::King => Self::King,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub color: Side,
    pub kind: Kind,
}

/// Complete board state: 64 squares in a1, b1, ..., h8 order, the same
/// placement in FEN syntax, and the side to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub squares: Vec<Option<PieceView>>,
    pub placement: String,
    pub turn: Side,
}

impl StateSnapshot {
    pub fn of(board: &Board) -> Self {
        let squares = square::all()
            .map(|sq| {
                board.piece_at(sq).map(|p| PieceView {
                    color: p.color.into(),
                    kind: p.role.into(),
                })
            })
            .collect();

        Self {
            squares,
            placement: board.to_placement(),
            turn: board.turn().into(),
        }
    }

    /// Rebuild the board from the square list alone.
    pub fn to_board(&self) -> Result<Board, BoardError> {
        if self.squares.len() != 64 {
            return Err(BoardError::MalformedPlacement(format!(
                "snapshot has {} squares",
                self.squares.len()
            )));
        }

        let pieces = square::all()
            .zip(self.squares.iter())
            .filter_map(|(sq, view)| {
                view.as_ref()
                    .map(|v| (sq, piece(v.color.into(), v.kind.into())))
            });
        Board::from_pieces(pieces, self.turn.into())
    }
}

impl From<&Board> for StateSnapshot {
    fn from(board: &Board) -> Self {
        Self::of(board)
    }
}
