//! Piece, color and kind vocabulary.

use shakmaty::{Color, Piece, Role};

use crate::error::BoardError;

/// The kind of a piece. Alias kept so callers can name promotion targets
/// without reaching into shakmaty.
pub type PieceKind = Role;

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

pub fn kind_name(kind: PieceKind) -> &'static str {
    match kind {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// Accepts `"w"`/`"white"` and `"b"`/`"black"`, case-insensitive.
pub fn parse_color(text: &str) -> Result<Color, BoardError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => Err(BoardError::InvalidTurn(text.to_string())),
    }
}

/// Accepts a letter (`"q"`) or a full name (`"queen"`), case-insensitive.
pub fn parse_kind(text: &str) -> Result<PieceKind, BoardError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "p" | "pawn" => Ok(Role::Pawn),
        "n" | "knight" => Ok(Role::Knight),
        "b" | "bishop" => Ok(Role::Bishop),
        "r" | "rook" => Ok(Role::Rook),
        "q" | "queen" => Ok(Role::Queen),
        "k" | "king" => Ok(Role::King),
        _ => Err(BoardError::InvalidPieceKind(text.to_string())),
    }
}

/// Kinds a pawn may turn into on its last rank.
pub fn is_promotion_kind(kind: PieceKind) -> bool {
    matches!(kind, Role::Knight | Role::Bishop | Role::Rook | Role::Queen)
}

pub fn piece(color: Color, kind: PieceKind) -> Piece {
    Piece { color, role: kind }
}

/// Direction pawns of `color` advance in, as a rank delta.
pub fn forward(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Rank pawns of `color` start on.
pub fn pawn_home_rank(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => 6,
    }
}

/// Rank on which pawns of `color` promote.
pub fn last_rank(color: Color) -> i32 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds_by_letter_and_name() {
        assert_eq!(parse_kind("q").unwrap(), Role::Queen);
        assert_eq!(parse_kind("Queen").unwrap(), Role::Queen);
        assert_eq!(parse_kind("N").unwrap(), Role::Knight);
        assert!(parse_kind("dragon").is_err());
    }

    #[test]
    fn only_minor_and_major_pieces_are_promotion_targets() {
        assert!(is_promotion_kind(Role::Queen));
        assert!(is_promotion_kind(Role::Knight));
        assert!(!is_promotion_kind(Role::King));
        assert!(!is_promotion_kind(Role::Pawn));
    }

    #[test]
    fn ranks_mirror_between_colors() {
        assert_eq!(pawn_home_rank(Color::White) + pawn_home_rank(Color::Black), 7);
        assert_eq!(last_rank(Color::White) + last_rank(Color::Black), 7);
        assert_eq!(forward(Color::White), -forward(Color::Black));
    }

    #[test]
    fn parses_turn_markers() {
        assert_eq!(parse_color("w").unwrap(), Color::White);
        assert_eq!(parse_color("BLACK").unwrap(), Color::Black);
        assert!(parse_color("red").is_err());
    }
}
