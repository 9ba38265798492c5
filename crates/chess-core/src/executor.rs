//! Move application.

use crate::board::Board;
use crate::moves::Move;
use crate::piece::piece;

/// Apply a move that already passed validation, returning the next board
/// with the turn handed to the other side. The input board is untouched.
///
/// The piece on `start` lands on `end` (as the promotion kind when one is
/// given); anything standing on `end` is captured. If `start` is empty the
/// board is returned unchanged.
pub fn apply(board: &Board, mv: &Move) -> Board {
    let mut next = board.clone();
    let Some(mover) = board.piece_at(mv.start) else {
        return next;
    };

    let placed = match mv.promotion {
        Some(kind) => piece(mover.color, kind),
        None => mover,
    };
    next.relocate(mv.start, mv.end, placed);
    next
}
