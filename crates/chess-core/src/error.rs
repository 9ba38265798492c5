use thiserror::Error;

/// Errors raised while parsing or constructing board state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid piece kind: {0:?}")]
    InvalidPieceKind(String),

    #[error("invalid side to move: {0:?}")]
    InvalidTurn(String),

    #[error("malformed placement: {0}")]
    MalformedPlacement(String),

    #[error("expected exactly one {color} king, found {count}")]
    KingCount { color: &'static str, count: usize },

    #[error("two pieces placed on {0}")]
    DuplicateSquare(String),
}
