//! Database schema migrations.
//!
//! Applies the conversation history schema and tracks applied versions in
//! `schema_migrations`.

use rusqlite::Connection;
use tracing::info;

use twintone_core::error::TwinToneError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), TwinToneError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| {
        TwinToneError::Persistence(format!("Failed to create migrations table: {}", e))
    })?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| {
            TwinToneError::Persistence(format!("Failed to query migration version: {}", e))
        })?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: conversation_history");
    }

    Ok(())
}

/// Version 1: conversation history.
///
/// `created_at` is stored as Unix milliseconds (UTC).
fn apply_v1(conn: &Connection) -> Result<(), TwinToneError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS conversation_history (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id  TEXT NOT NULL UNIQUE,
            user_id          TEXT NOT NULL,
            query            TEXT NOT NULL,
            casual_response  TEXT NOT NULL,
            formal_response  TEXT NOT NULL,
            created_at       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_history_user_created
            ON conversation_history (user_id, created_at DESC, id ASC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'conversation_history');
        ",
    )
    .map_err(|e| TwinToneError::Persistence(format!("Failed to apply migration v1: {}", e)))?;
    Ok(())
}
