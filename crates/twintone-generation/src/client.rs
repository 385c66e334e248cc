use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use twintone_core::config::GenerationConfig;
use twintone_core::Tone;

use crate::backend::GenerationBackend;
use crate::error::GenerationError;
use crate::retry::{execute_with_retry, RetryPolicy};

/// Wraps a [`GenerationBackend`] with prompt validation, a per-attempt
/// timeout and retry on transient failures.
///
/// Holds no per-call state, so one client is shared across all requests.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl GenerationClient {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            policy,
            attempt_timeout,
        }
    }

    pub fn from_config(backend: Arc<dyn GenerationBackend>, config: &GenerationConfig) -> Self {
        Self::new(
            backend,
            RetryPolicy::from_config(config),
            config.attempt_timeout(),
        )
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generate text for `prompt` in the given tone.
    pub async fn generate(&self, prompt: &str, tone: Tone) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::invalid_request("prompt must not be empty"));
        }

        let backend = Arc::clone(&self.backend);
        let attempt_timeout = self.attempt_timeout;

        let text = execute_with_retry(
            tone.as_str(),
            &self.policy,
            |_attempt| {
                let backend = Arc::clone(&backend);
                async move {
                    match tokio::time::timeout(attempt_timeout, backend.complete(prompt, tone)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(GenerationError::timeout(format!(
                            "{} generation attempt exceeded {}ms",
                            tone,
                            attempt_timeout.as_millis()
                        ))),
                    }
                }
            },
            tokio::time::sleep,
        )
        .await?;

        info!(tone = %tone, backend = self.backend.name(), chars = text.len(), "Generation succeeded");
        Ok(text)
    }
}
