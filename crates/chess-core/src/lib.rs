//! Chess rules for friend games: board state, move legality and application,
//! and the snapshot format sent to subscribed clients.

pub mod board;
pub mod error;
pub mod executor;
pub mod moves;
pub mod piece;
pub mod snapshot;
pub mod square;
pub mod validator;

pub use board::Board;
pub use error::BoardError;
pub use executor::apply;
pub use moves::Move;
pub use piece::PieceKind;
pub use snapshot::{Kind, PieceView, Side, StateSnapshot};
pub use validator::{MoveValidator, Rejection};

pub use shakmaty::{Color, Piece, Role, Square};
