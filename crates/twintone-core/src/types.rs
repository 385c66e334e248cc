use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TwinToneError};

// =============================================================================
// Enums
// =============================================================================

/// Response register requested from the generation backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Friendly, conversational explanation.
    Casual,
    /// Structured, academic explanation.
    Formal,
}

impl Tone {
    pub const ALL: [Tone; 2] = [Tone::Casual, Tone::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Casual => "casual",
            Tone::Formal => "formal",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Generation results
// =============================================================================

/// The joint result of one casual and one formal generation.
///
/// Only ever constructed once both tones succeeded, so holding one of these
/// means both fields are populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualToneResponse {
    pub casual: String,
    pub formal: String,
}

impl DualToneResponse {
    pub fn new(casual: impl Into<String>, formal: impl Into<String>) -> Self {
        Self {
            casual: casual.into(),
            formal: formal.into(),
        }
    }
}

// =============================================================================
// Conversation records
// =============================================================================

/// A conversation that has not been persisted yet.
///
/// Built from a complete [`DualToneResponse`]; there is no constructor that
/// accepts a single tone. `created_at` is truncated to whole milliseconds,
/// the precision history is stored at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewConversation {
    pub conversation_id: Uuid,
    pub user_id: String,
    pub query: String,
    pub casual_response: String,
    pub formal_response: String,
    pub created_at: DateTime<Utc>,
}

impl NewConversation {
    pub fn from_dual_tone(
        user_id: impl Into<String>,
        query: impl Into<String>,
        responses: DualToneResponse,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            user_id: user_id.into(),
            query: query.into(),
            casual_response: responses.casual,
            formal_response: responses.formal,
            created_at: created_at.trunc_subsecs(3),
        }
    }

    /// Attach the storage-assigned sequence id.
    pub fn into_record(self, id: i64) -> ConversationRecord {
        ConversationRecord {
            id,
            conversation_id: self.conversation_id,
            user_id: self.user_id,
            query: self.query,
            casual_response: self.casual_response,
            formal_response: self.formal_response,
            created_at: self.created_at,
        }
    }
}

/// One persisted interaction. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Monotonic sequence id assigned by storage.
    pub id: i64,
    /// Public identifier.
    pub conversation_id: Uuid,
    pub user_id: String,
    pub query: String,
    pub casual_response: String,
    pub formal_response: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Pagination
// =============================================================================

/// A validated `(limit, offset)` window over a user's history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u64,
}

impl Page {
    /// Validate raw pagination input.
    ///
    /// `limit` must be in `1..=max_limit`, `offset` must be non-negative.
    pub fn new(limit: i64, offset: i64, max_limit: u32) -> Result<Self> {
        if limit < 1 {
            return Err(TwinToneError::Validation(format!(
                "limit must be a positive integer, got {}",
                limit
            )));
        }
        if limit > i64::from(max_limit) {
            return Err(TwinToneError::Validation(format!(
                "limit must not exceed {}, got {}",
                max_limit, limit
            )));
        }
        if offset < 0 {
            return Err(TwinToneError::Validation(format!(
                "offset must be non-negative, got {}",
                offset
            )));
        }
        Ok(Self {
            limit: limit as u32,
            offset: offset as u64,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_responses() -> DualToneResponse {
        DualToneResponse::new(
            "AI is like a really smart assistant!",
            "Artificial intelligence refers to the simulation of human intelligence by machines.",
        )
    }

    #[test]
    fn test_tone_display_and_serde() {
        assert_eq!(Tone::Casual.to_string(), "casual");
        assert_eq!(Tone::Formal.to_string(), "formal");
        assert_eq!(serde_json::to_string(&Tone::Formal).unwrap(), "\"formal\"");
        let parsed: Tone = serde_json::from_str("\"casual\"").unwrap();
        assert_eq!(parsed, Tone::Casual);
    }

    #[test]
    fn test_new_conversation_carries_both_tones() {
        let now = Utc::now();
        let conv = NewConversation::from_dual_tone("user123", "What is AI?", sample_responses(), now);
        assert_eq!(conv.user_id, "user123");
        assert_eq!(conv.query, "What is AI?");
        assert!(!conv.casual_response.is_empty());
        assert!(!conv.formal_response.is_empty());
        assert_eq!(conv.created_at, now.trunc_subsecs(3));

        let record = conv.clone().into_record(7);
        assert_eq!(record.id, 7);
        assert_eq!(record.conversation_id, conv.conversation_id);
        assert_eq!(record.casual_response, conv.casual_response);
    }

    #[test]
    fn test_new_conversation_truncates_to_millis() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let conv = NewConversation::from_dual_tone("u", "q", sample_responses(), precise);
        assert_eq!(conv.created_at.timestamp_millis(), precise.timestamp_millis());
        assert_eq!(conv.created_at.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_new_conversation_ids_are_unique() {
        let now = Utc::now();
        let a = NewConversation::from_dual_tone("u", "q", sample_responses(), now);
        let b = NewConversation::from_dual_tone("u", "q", sample_responses(), now);
        assert_ne!(a.conversation_id, b.conversation_id);
    }

    #[test]
    fn test_page_accepts_valid_window() {
        let page = Page::new(10, 0, 100).unwrap();
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);

        let page = Page::new(100, 5_000, 100).unwrap();
        assert_eq!(page.limit(), 100);
        assert_eq!(page.offset(), 5_000);
    }

    #[test]
    fn test_page_rejects_non_positive_limit() {
        assert!(matches!(Page::new(0, 0, 100), Err(TwinToneError::Validation(_))));
        assert!(matches!(Page::new(-3, 0, 100), Err(TwinToneError::Validation(_))));
    }

    #[test]
    fn test_page_rejects_limit_above_max() {
        let err = Page::new(101, 0, 100).unwrap_err();
        assert!(err.to_string().contains("must not exceed 100"));
    }

    #[test]
    fn test_page_rejects_negative_offset() {
        let err = Page::new(10, -1, 100).unwrap_err();
        assert!(matches!(err, TwinToneError::Validation(_)));
        assert!(err.to_string().contains("offset"));
    }

    #[test]
    fn test_record_serializes_rfc3339_timestamp() {
        let record = NewConversation::from_dual_tone("u", "q", sample_responses(), Utc::now())
            .into_record(1);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json["created_at"].as_str().unwrap().contains('T'));
    }
}
