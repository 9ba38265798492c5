//! Square addressing helpers on top of shakmaty's `Square`.
//!
//! Files and ranks are exposed as signed integers (0-7) so move geometry can
//! be computed with plain deltas.

use shakmaty::{File, Rank, Square};

use crate::error::BoardError;

/// Parse algebraic notation such as `"e2"`. The file letter may be upper case.
pub fn parse_square(text: &str) -> Result<Square, BoardError> {
    Square::from_ascii(text.trim().to_ascii_lowercase().as_bytes())
        .map_err(|_| BoardError::InvalidSquare(text.to_string()))
}

pub fn file_of(sq: Square) -> i32 {
    sq.file() as i32
}

pub fn rank_of(sq: Square) -> i32 {
    sq.rank() as i32
}

/// Build a square from signed coordinates, `None` when off the board.
pub fn at(file: i32, rank: i32) -> Option<Square> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::from_coords(
            File::new(file as u32),
            Rank::new(rank as u32),
        ))
    } else {
        None
    }
}

/// The square `df` files and `dr` ranks away from `sq`.
pub fn offset(sq: Square, df: i32, dr: i32) -> Option<Square> {
    at(file_of(sq) + df, rank_of(sq) + dr)
}

/// Index in a1, b1, ..., h8 order.
pub fn index_of(sq: Square) -> usize {
    (rank_of(sq) * 8 + file_of(sq)) as usize
}

/// All 64 squares in a1, b1, ..., h8 order.
pub fn all() -> impl Iterator<Item = Square> {
    (0..64i32).filter_map(|i| at(i % 8, i / 8))
}
