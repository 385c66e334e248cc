use async_trait::async_trait;
use twintone_core::Tone;

use crate::backend::GenerationBackend;
use crate::error::GenerationError;

/// Offline backend that answers every prompt with deterministic,
/// tone-labelled text. Selected with `provider = "mock"`.
///
/// The answer restates the whole prompt on one line, so the query (or the
/// draft being refined) always shows up in the output.
#[derive(Debug, Clone, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn complete(&self, prompt: &str, tone: Tone) -> Result<String, GenerationError> {
        let subject = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
        let text = match tone {
            Tone::Casual => format!("[casual] Here's the gist, friend: {subject}"),
            Tone::Formal => format!("[formal] The following addresses the matter of: {subject}"),
        };
        Ok(text)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
