//! Persistence layer modules.

pub mod db;
pub mod locks;
pub mod question_repo;
pub mod schema;
pub mod session_repo;
pub mod verification_repo;
pub mod violation_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
