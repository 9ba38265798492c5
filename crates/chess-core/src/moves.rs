use std::fmt;

use shakmaty::Square;

use crate::error::BoardError;
use crate::piece::{parse_kind, PieceKind};
use crate::square::parse_square;

/// A requested move. Nothing about it has been checked against a board yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub start: Square,
    pub end: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(start: Square, end: Square) -> Self {
        Self {
            start,
            end,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }

    /// Parse request fields. An empty promotion string counts as absent,
    /// since form posts send `""` for an unselected promotion.
    pub fn parse(start: &str, end: &str, promotion: Option<&str>) -> Result<Self, BoardError> {
        let promotion = match promotion.map(str::trim) {
            None | Some("") => None,
            Some(kind) => Some(parse_kind(kind)?),
        };

        Ok(Self {
            start: parse_square(start)?,
            end: parse_square(end)?,
            promotion,
        })
    }
}

/// UCI-style rendering: `e2e4`, `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.char())?;
        }
        Ok(())
    }
}
