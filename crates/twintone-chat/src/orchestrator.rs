//! Tone orchestrator: produces the casual and formal answers for one query.
//!
//! Both tones are generated concurrently and joined all-or-nothing. The
//! first failure drops the other in-flight generation, and dropping the
//! returned future (client disconnect, request timeout) cancels both.

use tracing::{debug, info, warn};
use twintone_core::config::ChatConfig;
use twintone_core::{DualToneResponse, Tone};
use twintone_generation::{GenerationClient, GenerationError};

use crate::prompt::{initial_prompt, refine_prompt};

/// Coordinates the two tone generations for a query.
#[derive(Clone)]
pub struct ToneOrchestrator {
    client: GenerationClient,
    refine: bool,
}

impl ToneOrchestrator {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            refine: false,
        }
    }

    pub fn from_config(client: GenerationClient, config: &ChatConfig) -> Self {
        Self::new(client).with_refine(config.refine)
    }

    /// Enable the second, tone-preserving refinement pass.
    pub fn with_refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.client.backend_name()
    }

    /// Generate both tones for `query`.
    ///
    /// Returns only when both succeed. If either fails, the error is
    /// returned and the other tone's result is discarded.
    pub async fn produce_dual_tone(
        &self,
        query: &str,
        user_id: &str,
    ) -> Result<DualToneResponse, GenerationError> {
        debug!(user_id, refine = self.refine, "Starting dual-tone generation");

        let result = tokio::try_join!(
            self.generate_tone(Tone::Casual, query),
            self.generate_tone(Tone::Formal, query),
        );

        match result {
            Ok((casual, formal)) => {
                info!(user_id, "Dual-tone generation completed");
                Ok(DualToneResponse::new(casual, formal))
            }
            Err(err) => {
                warn!(user_id, error = %err, "Dual-tone generation failed");
                Err(err)
            }
        }
    }

    async fn generate_tone(&self, tone: Tone, query: &str) -> Result<String, GenerationError> {
        let initial = self
            .client
            .generate(&initial_prompt(tone, query), tone)
            .await?;
        if !self.refine {
            return Ok(initial);
        }
        debug!(tone = %tone, "Refining initial response");
        self.client.generate(&refine_prompt(tone, &initial), tone).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Barrier;
    use twintone_generation::{GenerationBackend, GenerationErrorKind, MockBackend, RetryPolicy};

    use super::*;

    fn client(backend: Arc<dyn GenerationBackend>) -> GenerationClient {
        GenerationClient::new(
            backend,
            RetryPolicy {
                max_attempts: 1,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(1),
                backoff_multiplier: 2.0,
            },
            Duration::from_secs(30),
        )
    }

    /// Records every prompt and echoes it back with the tone.
    #[derive(Default)]
    struct RecordingBackend {
        prompts: Mutex<Vec<(Tone, String)>>,
    }

    #[async_trait]
    impl GenerationBackend for RecordingBackend {
        async fn complete(&self, prompt: &str, tone: Tone) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push((tone, prompt.to_string()));
            Ok(format!("{tone} answer #{}", self.prompts.lock().unwrap().len()))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Fails the given tone shortly after starting; the other never finishes.
    struct FailOneHangOther {
        failing: Tone,
        dropped: Arc<AtomicUsize>,
    }

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl GenerationBackend for FailOneHangOther {
        async fn complete(&self, _prompt: &str, tone: Tone) -> Result<String, GenerationError> {
            if tone == self.failing {
                tokio::time::sleep(Duration::from_millis(10)).await;
                return Err(GenerationError::authentication("rejected"));
            }
            let _guard = DropCounter(Arc::clone(&self.dropped));
            std::future::pending::<()>().await;
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "fail-one"
        }
    }

    /// Never finishes; counts how many in-flight calls were dropped.
    struct HangingBackend {
        dropped: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GenerationBackend for HangingBackend {
        async fn complete(&self, _prompt: &str, _tone: Tone) -> Result<String, GenerationError> {
            let _guard = DropCounter(Arc::clone(&self.dropped));
            std::future::pending::<()>().await;
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    /// Both calls must be in flight at once to pass the barrier.
    struct BarrierBackend {
        barrier: Barrier,
    }

    #[async_trait]
    impl GenerationBackend for BarrierBackend {
        async fn complete(&self, _prompt: &str, tone: Tone) -> Result<String, GenerationError> {
            self.barrier.wait().await;
            Ok(format!("{tone} after barrier"))
        }

        fn name(&self) -> &str {
            "barrier"
        }
    }

    #[tokio::test]
    async fn test_produces_both_tones() {
        let orchestrator = ToneOrchestrator::new(client(Arc::new(MockBackend::new())));
        let result = orchestrator
            .produce_dual_tone("What is artificial intelligence?", "user123")
            .await
            .unwrap();

        assert!(!result.casual.is_empty());
        assert!(!result.formal.is_empty());
        assert_ne!(result.casual, result.formal);
        assert!(result.casual.starts_with("[casual]"));
        assert!(result.formal.starts_with("[formal]"));
    }

    #[tokio::test]
    async fn test_mock_answers_follow_the_query() {
        let backend = MockBackend::new();
        for tone in Tone::ALL {
            let tides = backend
                .complete(&initial_prompt(tone, "ocean tides"), tone)
                .await
                .unwrap();
            let volcanoes = backend
                .complete(&initial_prompt(tone, "volcanoes"), tone)
                .await
                .unwrap();
            assert!(tides.contains("ocean tides"));
            assert!(volcanoes.contains("volcanoes"));
            assert_ne!(tides, volcanoes);
        }

        let orchestrator =
            ToneOrchestrator::new(client(Arc::new(MockBackend::new()))).with_refine(true);
        let result = orchestrator.produce_dual_tone("ocean tides", "u1").await.unwrap();
        assert!(result.casual.contains("ocean tides"));
        assert!(result.formal.contains("ocean tides"));
    }

    #[tokio::test]
    async fn test_each_tone_gets_its_own_prompt() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = ToneOrchestrator::new(client(backend.clone()));
        orchestrator.produce_dual_tone("black holes", "u1").await.unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        let casual = prompts.iter().find(|(t, _)| *t == Tone::Casual).unwrap();
        let formal = prompts.iter().find(|(t, _)| *t == Tone::Formal).unwrap();
        assert!(casual.1.contains("over coffee"));
        assert!(formal.1.contains("scholarly audience"));
    }

    #[tokio::test]
    async fn test_tones_run_concurrently() {
        let backend = Arc::new(BarrierBackend {
            barrier: Barrier::new(2),
        });
        let orchestrator = ToneOrchestrator::new(client(backend));

        // Sequential execution would block on the barrier forever.
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator.produce_dual_tone("overlap", "u1"),
        )
        .await
        .expect("tones did not overlap")
        .unwrap();
        assert_eq!(result.casual, "casual after barrier");
        assert_eq!(result.formal, "formal after barrier");
    }

    #[tokio::test]
    async fn test_casual_failure_fails_whole_operation_and_cancels_formal() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(FailOneHangOther {
            failing: Tone::Casual,
            dropped: Arc::clone(&dropped),
        });
        let orchestrator = ToneOrchestrator::new(client(backend));

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator.produce_dual_tone("q", "u1"),
        )
        .await
        .expect("failure should short-circuit")
        .unwrap_err();

        assert_eq!(err.kind, GenerationErrorKind::Authentication);
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_formal_failure_fails_whole_operation() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(FailOneHangOther {
            failing: Tone::Formal,
            dropped: Arc::clone(&dropped),
        });
        let orchestrator = ToneOrchestrator::new(client(backend));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator.produce_dual_tone("q", "u1"),
        )
        .await
        .expect("failure should short-circuit");

        assert!(result.is_err());
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropping_future_cancels_both_calls() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(HangingBackend {
            dropped: Arc::clone(&dropped),
        });
        let orchestrator = ToneOrchestrator::new(client(backend));

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            orchestrator.produce_dual_tone("q", "u1"),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(dropped.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refine_pass_feeds_initial_answer_back() {
        let backend = Arc::new(RecordingBackend::default());
        let orchestrator = ToneOrchestrator::from_config(
            client(backend.clone()),
            &ChatConfig { refine: true },
        );
        let result = orchestrator.produce_dual_tone("gravity", "u1").await.unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);

        let casual_prompts: Vec<_> = prompts.iter().filter(|(t, _)| *t == Tone::Casual).collect();
        assert_eq!(casual_prompts.len(), 2);
        assert!(casual_prompts[0].1.contains("gravity"));
        assert!(casual_prompts[1].1.starts_with("Take this response:"));
        assert!(casual_prompts[1].1.contains("casual answer #"));

        assert!(result.casual.starts_with("casual answer #"));
        assert!(result.formal.starts_with("formal answer #"));
    }

    #[test]
    fn test_backend_name_passthrough() {
        let orchestrator = ToneOrchestrator::new(client(Arc::new(MockBackend::new())));
        assert_eq!(orchestrator.backend_name(), "mock");
    }
}
