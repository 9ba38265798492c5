pub mod cable;
pub mod chessgames;
pub mod health;
