pub mod chessgames;
pub mod pool;
pub mod relationships;

pub use chessgames::PgSessionStore;
pub use relationships::PgRelationships;
