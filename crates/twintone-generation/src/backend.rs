use async_trait::async_trait;
use twintone_core::Tone;

use crate::error::GenerationError;

/// An external generative-text capability.
///
/// Implementations make exactly one attempt per call. Retry and timeout
/// handling belong to [`GenerationClient`](crate::GenerationClient).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Produce a completion for `prompt`. `tone` is informational for
    /// backends that label or route by register.
    async fn complete(&self, prompt: &str, tone: Tone) -> Result<String, GenerationError>;

    /// Short backend identifier for logs and the health endpoint.
    fn name(&self) -> &str;
}
