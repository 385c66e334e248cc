//! Conversation history persistence.
//!
//! [`HistoryStore`] is the storage seam the gateway depends on;
//! [`SqliteHistoryStore`] implements it over [`Database`] with raw SQL.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;
use uuid::Uuid;

use twintone_core::error::TwinToneError;
use twintone_core::types::{ConversationRecord, NewConversation, Page};

use crate::db::Database;

/// Append-only store of completed dual-tone conversations.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a fully-populated record and return its sequence id.
    async fn append(&self, record: &NewConversation) -> Result<i64, TwinToneError>;

    /// A user's records, newest first, ties broken by ascending id.
    ///
    /// Unknown users and offsets past the end yield an empty vector.
    async fn list(&self, user_id: &str, page: Page) -> Result<Vec<ConversationRecord>, TwinToneError>;

    /// Every user id with at least one record, in first-seen order.
    async fn list_users(&self) -> Result<Vec<String>, TwinToneError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<u64, TwinToneError>;
}

/// SQLite-backed [`HistoryStore`]. Blocking work runs on the tokio
/// blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    db: Arc<Database>,
}

impl SqliteHistoryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, TwinToneError>
    where
        F: FnOnce(&Database) -> Result<T, TwinToneError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| TwinToneError::Persistence(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, record: &NewConversation) -> Result<i64, TwinToneError> {
        let record = record.clone();
        let id = self
            .run_blocking(move |db| {
                db.with_conn(|conn| {
                    conn.execute(
                        "INSERT INTO conversation_history
                            (conversation_id, user_id, query, casual_response, formal_response, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        rusqlite::params![
                            record.conversation_id.to_string(),
                            record.user_id,
                            record.query,
                            record.casual_response,
                            record.formal_response,
                            record.created_at.timestamp_millis(),
                        ],
                    )
                    .map_err(|e| {
                        TwinToneError::Persistence(format!("Failed to save conversation: {}", e))
                    })?;
                    Ok(conn.last_insert_rowid())
                })
            })
            .await?;
        debug!(id, "Conversation appended");
        Ok(id)
    }

    async fn list(&self, user_id: &str, page: Page) -> Result<Vec<ConversationRecord>, TwinToneError> {
        let user_id = user_id.to_string();
        self.run_blocking(move |db| {
            db.with_conn(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, conversation_id, user_id, query, casual_response, formal_response, created_at
                         FROM conversation_history
                         WHERE user_id = ?1
                         ORDER BY created_at DESC, id ASC
                         LIMIT ?2 OFFSET ?3",
                    )
                    .map_err(|e| TwinToneError::Persistence(e.to_string()))?;

                let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
                let rows = stmt
                    .query_map(
                        rusqlite::params![user_id, i64::from(page.limit()), offset],
                        RawRow::from_row,
                    )
                    .map_err(|e| TwinToneError::Persistence(e.to_string()))?;

                let mut records = Vec::new();
                for row in rows {
                    let raw = row.map_err(|e| TwinToneError::Persistence(e.to_string()))?;
                    records.push(raw.into_record()?);
                }
                Ok(records)
            })
        })
        .await
    }

    async fn list_users(&self) -> Result<Vec<String>, TwinToneError> {
        self.run_blocking(|db| {
            db.with_conn(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT user_id FROM conversation_history
                         GROUP BY user_id
                         ORDER BY MIN(id) ASC",
                    )
                    .map_err(|e| TwinToneError::Persistence(e.to_string()))?;

                let rows = stmt
                    .query_map([], |row| row.get::<_, String>(0))
                    .map_err(|e| TwinToneError::Persistence(e.to_string()))?;

                rows.collect::<Result<Vec<_>, _>>()
                    .map_err(|e| TwinToneError::Persistence(e.to_string()))
            })
        })
        .await
    }

    async fn count(&self) -> Result<u64, TwinToneError> {
        self.run_blocking(|db| {
            db.with_conn(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM conversation_history", [], |row| {
                        row.get(0)
                    })
                    .map_err(|e| TwinToneError::Persistence(e.to_string()))?;
                Ok(count as u64)
            })
        })
        .await
    }
}

// =============================================================================
// Row mapping
// =============================================================================

struct RawRow {
    id: i64,
    conversation_id: String,
    user_id: String,
    query: String,
    casual_response: String,
    formal_response: String,
    created_at_ms: i64,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            user_id: row.get(2)?,
            query: row.get(3)?,
            casual_response: row.get(4)?,
            formal_response: row.get(5)?,
            created_at_ms: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<ConversationRecord, TwinToneError> {
        let conversation_id = Uuid::parse_str(&self.conversation_id).map_err(|e| {
            TwinToneError::Persistence(format!(
                "Invalid conversation_id '{}' in row {}: {}",
                self.conversation_id, self.id, e
            ))
        })?;
        let created_at: DateTime<Utc> = Utc
            .timestamp_millis_opt(self.created_at_ms)
            .single()
            .ok_or_else(|| {
                TwinToneError::Persistence(format!(
                    "Invalid created_at {} in row {}",
                    self.created_at_ms, self.id
                ))
            })?;

        Ok(ConversationRecord {
            id: self.id,
            conversation_id,
            user_id: self.user_id,
            query: self.query,
            casual_response: self.casual_response,
            formal_response: self.formal_response,
            created_at,
        })
    }
}
