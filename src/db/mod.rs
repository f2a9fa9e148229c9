//! Database module
//!
//! SQLite connection pool and versioned migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
