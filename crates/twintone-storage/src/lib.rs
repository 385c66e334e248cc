//! TwinTone storage crate - SQLite conversation history.
//!
//! Provides a WAL-mode SQLite database with migrations and the
//! [`HistoryStore`] trait with its SQLite implementation.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{HistoryStore, SqliteHistoryStore};
