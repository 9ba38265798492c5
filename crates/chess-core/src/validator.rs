//! Move legality.
//!
//! Castling and en passant are not part of the rule set. Check-safety (a move
//! may not leave the mover's own king attacked) is off unless the validator is
//! built with [`MoveValidator::with_check_safety`].

use shakmaty::{Color, Role};
use thiserror::Error;

use crate::board::Board;
use crate::executor;
use crate::moves::Move;
use crate::piece::{is_promotion_kind, last_rank};
use crate::square::rank_of;

/// Why a move was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("not this side's turn")]
    NotYourTurn,
    #[error("start and end are the same square")]
    SameSquare,
    #[error("no piece on the start square")]
    EmptyStart,
    #[error("piece on the start square belongs to the opponent")]
    NotYourPiece,
    #[error("destination holds a piece of the same color")]
    OwnPieceAtDestination,
    #[error("kings cannot be captured")]
    KingCapture,
    #[error("piece cannot move that way")]
    InvalidShape,
    #[error("pawn reaching the last rank must promote")]
    PromotionRequired,
    #[error("promotion is only allowed for a pawn reaching the last rank")]
    PromotionNotAllowed,
    #[error("pawns promote to knight, bishop, rook or queen")]
    InvalidPromotionKind,
    #[error("move leaves own king in check")]
    LeavesKingInCheck,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveValidator {
    check_safety: bool,
}

impl MoveValidator {
    /// Shape-only validator.
    pub const fn new() -> Self {
        Self {
            check_safety: false,
        }
    }

    pub const fn with_check_safety(enabled: bool) -> Self {
        Self {
            check_safety: enabled,
        }
    }

    pub const fn check_safety(&self) -> bool {
        self.check_safety
    }

    pub fn is_legal(&self, board: &Board, moving: Color, mv: &Move) -> bool {
        self.check(board, moving, mv).is_ok()
    }

    /// Same decision as [`MoveValidator::is_legal`], with the reason.
    pub fn check(&self, board: &Board, moving: Color, mv: &Move) -> Result<(), Rejection> {
        if board.turn() != moving {
            return Err(Rejection::NotYourTurn);
        }
        if mv.start == mv.end {
            return Err(Rejection::SameSquare);
        }

        let mover = board.piece_at(mv.start).ok_or(Rejection::EmptyStart)?;
        if mover.color != moving {
            return Err(Rejection::NotYourPiece);
        }
        if board.color_at(mv.end) == Some(moving) {
            return Err(Rejection::OwnPieceAtDestination);
        }
        // Every board keeps one king per side, so no move may land on one.
        if board.piece_at(mv.end).is_some_and(|p| p.role == Role::King) {
            return Err(Rejection::KingCapture);
        }
        if !board.reaches(mv.start, mv.end) {
            return Err(Rejection::InvalidShape);
        }

        let promotes = mover.role == Role::Pawn && rank_of(mv.end) == last_rank(moving);
        match (promotes, mv.promotion) {
            (true, None) => return Err(Rejection::PromotionRequired),
            (false, Some(_)) => return Err(Rejection::PromotionNotAllowed),
            (true, Some(kind)) if !is_promotion_kind(kind) => {
                return Err(Rejection::InvalidPromotionKind)
            }
            _ => {}
        }

        if self.check_safety && leaves_king_attacked(board, moving, mv) {
            return Err(Rejection::LeavesKingInCheck);
        }

        Ok(())
    }
}

fn leaves_king_attacked(board: &Board, moving: Color, mv: &Move) -> bool {
    let next = executor::apply(board, mv);
    match next.king_square(moving) {
        Some(king) => next.is_attacked(king, moving.other()),
        // Unreachable: king captures are refused before this point.
        None => true,
    }
}
