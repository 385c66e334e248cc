//! Request gateway: validation, orchestration and persistence for the
//! generate, history and users operations.
//!
//! Transport-agnostic. The HTTP handlers translate to and from JSON and
//! call into this type.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use twintone_chat::ToneOrchestrator;
use twintone_core::config::GatewayConfig;
use twintone_core::error::{Result, TwinToneError};
use twintone_core::types::{ConversationRecord, NewConversation, Page};
use twintone_storage::HistoryStore;

/// Progress of a single generate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStage {
    Validating,
    Generating,
    Persisting,
    Completed,
    Rejected,
    Failed,
}

impl GenerateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerateStage::Validating => "validating",
            GenerateStage::Generating => "generating",
            GenerateStage::Persisting => "persisting",
            GenerateStage::Completed => "completed",
            GenerateStage::Rejected => "rejected",
            GenerateStage::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point for every inbound operation.
pub struct RequestGateway {
    orchestrator: ToneOrchestrator,
    store: Arc<dyn HistoryStore>,
    config: GatewayConfig,
    generation_timeout: Duration,
}

impl RequestGateway {
    pub fn new(
        orchestrator: ToneOrchestrator,
        store: Arc<dyn HistoryStore>,
        config: GatewayConfig,
    ) -> Self {
        let generation_timeout = config.generation_timeout();
        Self {
            orchestrator,
            store,
            config,
            generation_timeout,
        }
    }

    /// Override the bound on the combined duration of both tone calls.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &str {
        self.orchestrator.backend_name()
    }

    /// Validate, generate both tones, and persist one record.
    ///
    /// Nothing is written unless both tones succeed within the request
    /// timeout.
    pub async fn generate(&self, query: &str, user_id: &str) -> Result<ConversationRecord> {
        let mut stage = GenerateStage::Validating;
        debug!(%stage, user_id, "Generate request received");

        if let Err(err) = self.validate_generate(query, user_id) {
            stage = GenerateStage::Rejected;
            debug!(%stage, error = %err, "Generate request rejected");
            return Err(err);
        }

        stage = GenerateStage::Generating;
        debug!(%stage, user_id, "Generating dual-tone response");

        let responses = match tokio::time::timeout(
            self.generation_timeout,
            self.orchestrator.produce_dual_tone(query, user_id),
        )
        .await
        {
            Ok(Ok(responses)) => responses,
            Ok(Err(err)) => {
                warn!(stage = %GenerateStage::Failed, failed_at = %stage, user_id, error = %err, "Generation failed");
                return Err(err.into());
            }
            Err(_) => {
                warn!(
                    stage = %GenerateStage::Failed,
                    failed_at = %stage,
                    user_id,
                    timeout_ms = self.generation_timeout.as_millis() as u64,
                    "Generation timed out"
                );
                return Err(TwinToneError::Generation(format!(
                    "generation timed out after {}ms",
                    self.generation_timeout.as_millis()
                )));
            }
        };

        stage = GenerateStage::Persisting;
        debug!(%stage, user_id, "Persisting conversation");

        let record = NewConversation::from_dual_tone(user_id, query, responses, Utc::now());
        let id = match self.store.append(&record).await {
            Ok(id) => id,
            Err(err) => {
                error!(stage = %GenerateStage::Failed, failed_at = %stage, user_id, error = %err, "Persistence failed");
                return Err(match err {
                    TwinToneError::Persistence(msg) => TwinToneError::Persistence(msg),
                    other => TwinToneError::Persistence(other.to_string()),
                });
            }
        };

        stage = GenerateStage::Completed;
        info!(%stage, id, user_id, conversation_id = %record.conversation_id, "Generate completed");
        Ok(record.into_record(id))
    }

    /// A page of the user's history, newest first.
    ///
    /// `limit` defaults to the configured default page size, `offset` to 0.
    pub async fn history(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ConversationRecord>> {
        let page = Page::new(
            limit.unwrap_or(i64::from(self.config.default_history_limit)),
            offset.unwrap_or(0),
            self.config.max_history_limit,
        )?;
        let records = self.store.list(user_id, page).await?;
        debug!(
            user_id,
            limit = page.limit(),
            offset = page.offset(),
            returned = records.len(),
            "History listed"
        );
        Ok(records)
    }

    /// Every user with at least one stored conversation.
    pub async fn users(&self) -> Result<Vec<String>> {
        self.store.list_users().await
    }

    pub async fn total_conversations(&self) -> Result<u64> {
        self.store.count().await
    }

    fn validate_generate(&self, query: &str, user_id: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(TwinToneError::Validation("query must not be empty".to_string()));
        }
        let query_chars = query.chars().count();
        if query_chars > self.config.max_query_chars {
            return Err(TwinToneError::Validation(format!(
                "query must be at most {} characters, got {}",
                self.config.max_query_chars, query_chars
            )));
        }
        if user_id.trim().is_empty() {
            return Err(TwinToneError::Validation(
                "user_id must not be empty".to_string(),
            ));
        }
        let user_id_chars = user_id.chars().count();
        if user_id_chars > self.config.max_user_id_chars {
            return Err(TwinToneError::Validation(format!(
                "user_id must be at most {} characters, got {}",
                self.config.max_user_id_chars, user_id_chars
            )));
        }
        Ok(())
    }
}
