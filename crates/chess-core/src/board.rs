//! Board placement, side to move, and per-piece movement shapes.
//!
//! A `Board` always holds exactly one king per color. The only ways to build
//! one are the standard start, [`Board::from_pieces`] and
//! [`Board::from_placement`], all of which check that invariant, so the
//! validator never has to cope with malformed input.

use shakmaty::attacks;
use shakmaty::fen::ParseFenError;
use shakmaty::{Color, Piece, Role, Square};

use crate::error::BoardError;
use crate::piece::{self, color_name};
use crate::square::{self, file_of, rank_of};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    placement: shakmaty::Board,
    turn: Color,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Standard starting position, white to move.
    pub fn standard() -> Self {
        Self {
            placement: shakmaty::Board::new(),
            turn: Color::White,
        }
    }

    /// Build a board from explicit pieces.
    pub fn from_pieces<I>(pieces: I, turn: Color) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (Square, Piece)>,
    {
        let mut placement = shakmaty::Board::empty();
        for (sq, p) in pieces {
            if placement.piece_at(sq).is_some() {
                return Err(BoardError::DuplicateSquare(sq.to_string()));
            }
            placement.set_piece_at(sq, p);
        }

        let board = Self { placement, turn };
        board.check_kings()?;
        Ok(board)
    }

    /// Parse FEN piece placement (the first FEN field), e.g.
    /// `rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR`.
    pub fn from_placement(text: &str, turn: Color) -> Result<Self, BoardError> {
        let placement: shakmaty::Board = text
            .trim()
            .parse()
            .map_err(|e: ParseFenError| BoardError::MalformedPlacement(format!("{text:?}: {e}")))?;

        let board = Self { placement, turn };
        board.check_kings()?;
        Ok(board)
    }

    /// Render FEN piece placement.
    pub fn to_placement(&self) -> String {
        self.placement.to_string()
    }

    fn check_kings(&self) -> Result<(), BoardError> {
        for color in [Color::White, Color::Black] {
            let count = self
                .pieces()
                .filter(|(_, p)| p.color == color && p.role == Role::King)
                .count();
            if count != 1 {
                return Err(BoardError::KingCount {
                    color: color_name(color),
                    count,
                });
            }
        }
        Ok(())
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.placement.piece_at(sq)
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|p| p.color)
    }

    /// Occupied squares in a1..h8 order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.role == Role::King)
            .map(|(sq, _)| sq)
    }

    /// Move whatever stands on `from` to `to` as `placed`, dropping any piece
    /// on `to`, and hand the move to the other side. Only the executor calls
    /// this, and always on a fresh clone.
    pub(crate) fn relocate(&mut self, from: Square, to: Square, placed: Piece) {
        self.placement.remove_piece_at(from);
        self.placement.remove_piece_at(to);
        self.placement.set_piece_at(to, placed);
        self.turn = self.turn.other();
    }

    /// Shape legality: can the piece on `from` travel to `to`?
    ///
    /// Ignores check and ignores the color of whatever stands on `to`, except
    /// for pawns, whose pushes need an empty target and whose diagonal step
    /// needs an enemy there.
    pub fn reaches(&self, from: Square, to: Square) -> bool {
        let Some(mover) = self.piece_at(from) else {
            return false;
        };
        if from == to {
            return false;
        }

        let df = file_of(to) - file_of(from);
        let dr = rank_of(to) - rank_of(from);

        match mover.role {
            Role::Pawn => self.pawn_reaches(mover.color, from, to, df, dr),
            Role::Knight => matches!((df.abs(), dr.abs()), (1, 2) | (2, 1)),
            Role::Bishop => df.abs() == dr.abs() && self.path_clear(from, to),
            Role::Rook => (df == 0 || dr == 0) && self.path_clear(from, to),
            Role::Queen => {
                (df == 0 || dr == 0 || df.abs() == dr.abs()) && self.path_clear(from, to)
            }
            Role::King => df.abs() <= 1 && dr.abs() <= 1,
        }
    }

    /// Capture geometry: would the piece on `from` take something on `to`?
    /// Differs from [`Board::reaches`] only for pawns, which attack
    /// diagonally whether or not the target is occupied.
    pub fn attacks(&self, from: Square, to: Square) -> bool {
        self.piece_at(from)
            .is_some_and(|p| attacks::attacks(from, p, self.placement.occupied()).contains(to))
    }

    /// Is `sq` attacked by any piece of `by`?
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        !self
            .placement
            .attacks_to(sq, by, self.placement.occupied())
            .is_empty()
    }

    fn pawn_reaches(&self, color: Color, from: Square, to: Square, df: i32, dr: i32) -> bool {
        let step = piece::forward(color);
        let target = self.piece_at(to);

        if df == 0 {
            if target.is_some() {
                return false;
            }
            if dr == step {
                return true;
            }
            dr == 2 * step
                && rank_of(from) == piece::pawn_home_rank(color)
                && square::offset(from, 0, step).is_some_and(|mid| self.is_empty(mid))
        } else if df.abs() == 1 && dr == step {
            target.is_some_and(|p| p.color != color)
        } else {
            false
        }
    }

    /// True when every square strictly between `from` and `to` is empty.
    /// Callers guarantee the two squares share a line or diagonal.
    fn path_clear(&self, from: Square, to: Square) -> bool {
        (attacks::between(from, to) & self.placement.occupied()).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::parse_square;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    fn sq(name: &str) -> Square {
        parse_square(name).unwrap()
    }

    #[test]
    fn standard_board_matches_start_placement() {
        let board = Board::standard();
        assert_eq!(board.to_placement(), START);
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
    }

    #[test]
    fn placement_parses_back_to_the_same_board() {
        let text = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R";
        let board = Board::from_placement(text, Color::White).unwrap();
        assert_eq!(board.to_placement(), text);
        assert_eq!(
            board.piece_at(sq("c6")),
            Some(Piece { color: Color::Black, role: Role::Knight })
        );
    }

    #[test]
    fn queries_report_occupancy_and_color() {
        let board = Board::standard();
        assert!(board.is_empty(sq("e4")));
        assert_eq!(board.color_at(sq("e2")), Some(Color::White));
        assert_eq!(board.color_at(sq("d8")), Some(Color::Black));
        assert_eq!(board.color_at(sq("d5")), None);
    }

    #[test]
    fn malformed_placements_are_rejected() {
        let cases = [
            "8/8/8/8/8/8/8",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/pppxpppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/pppppppp/7/8/8/8/PPPPPPPP/RNBQKBNR",
        ];
        for text in cases {
            assert!(
                matches!(
                    Board::from_placement(text, Color::White),
                    Err(BoardError::MalformedPlacement(_))
                ),
                "{text} should be malformed"
            );
        }
    }

    #[test]
    fn king_invariant_is_enforced() {
        let no_black_king = Board::from_placement("8/8/8/8/8/8/8/4K3", Color::White);
        assert_eq!(
            no_black_king,
            Err(BoardError::KingCount { color: "black", count: 0 })
        );

        let two_white_kings = Board::from_placement("4k3/8/8/8/8/8/8/3KK3", Color::White);
        assert_eq!(
            two_white_kings,
            Err(BoardError::KingCount { color: "white", count: 2 })
        );
    }

    #[test]
    fn duplicate_squares_are_rejected() {
        let king = Piece { color: Color::White, role: Role::King };
        let result = Board::from_pieces([(sq("e1"), king), (sq("e1"), king)], Color::White);
        assert!(matches!(result, Err(BoardError::DuplicateSquare(_))));
    }

    #[test]
    fn pawn_shapes() {
        let board = Board::standard();
        assert!(board.reaches(sq("e2"), sq("e3")));
        assert!(board.reaches(sq("e2"), sq("e4")));
        assert!(!board.reaches(sq("e2"), sq("e5")));
        assert!(!board.reaches(sq("e2"), sq("d3")), "no diagonal onto empty square");
        assert!(!board.reaches(sq("e2"), sq("e1")));
        assert!(board.reaches(sq("d7"), sq("d5")));

        // Blocked double push
        let blocked =
            Board::from_placement("4k3/8/8/8/8/4n3/4P3/4K3", Color::White).unwrap();
        assert!(!blocked.reaches(sq("e2"), sq("e4")));
        assert!(!blocked.reaches(sq("e2"), sq("e3")));
    }

    #[test]
    fn pawn_captures_need_an_enemy() {
        let board = Board::from_placement("4k3/8/8/3p1P2/4P3/8/8/4K3", Color::White).unwrap();
        assert!(board.reaches(sq("e4"), sq("d5")));
        assert!(!board.reaches(sq("e4"), sq("f5")), "own piece on f5");
        assert!(board.attacks(sq("e4"), sq("f5")));
    }

    #[test]
    fn slider_paths_stop_at_blockers() {
        let board = Board::standard();
        assert!(!board.reaches(sq("a1"), sq("a3")));
        assert!(!board.reaches(sq("c1"), sq("e3")));
        assert!(!board.reaches(sq("d1"), sq("d3")));

        let open = Board::from_placement("4k3/8/8/8/3Q4/8/8/R3K3", Color::White).unwrap();
        assert!(open.reaches(sq("a1"), sq("a8")));
        assert!(open.reaches(sq("a1"), sq("d1")));
        assert!(!open.reaches(sq("a1"), sq("f1")), "king on e1 blocks");
        assert!(open.reaches(sq("d4"), sq("h8")));
        assert!(open.reaches(sq("d4"), sq("d8")));
        assert!(!open.reaches(sq("d4"), sq("e6")));
    }

    #[test]
    fn knight_and_king_shapes() {
        let board = Board::standard();
        assert!(board.reaches(sq("g1"), sq("f3")));
        assert!(board.reaches(sq("g1"), sq("h3")));
        assert!(!board.reaches(sq("g1"), sq("g3")));

        assert!(board.reaches(sq("e1"), sq("e2")));
        assert!(!board.reaches(sq("e1"), sq("e3")));
        assert!(!board.reaches(sq("e1"), sq("g1")), "castling is not a king shape");
    }

    #[test]
    fn attack_detection() {
        let board = Board::from_placement("4k3/8/8/8/8/8/3p4/4K2r", Color::White).unwrap();
        assert!(board.is_attacked(sq("e1"), Color::Black));
        assert!(board.is_attacked(sq("f1"), Color::Black));
        assert!(!board.is_attacked(sq("e2"), Color::Black));
        assert!(!board.is_attacked(sq("d1"), Color::Black), "king on e1 shields d1");
        assert!(board.attacks(sq("h1"), sq("f1")));
        assert!(!board.attacks(sq("h1"), sq("d1")));
        assert!(board.attacks(sq("d2"), sq("c1")));
    }

    #[test]
    fn placement_text_is_trimmed_and_rendered_canonically() {
        let board = Board::from_placement("  4k3/8/8/8/8/8/8/4K3\n", Color::Black).unwrap();
        assert_eq!(board.to_placement(), "4k3/8/8/8/8/8/8/4K3");
        assert_eq!(board.turn(), Color::Black);
    }
}
