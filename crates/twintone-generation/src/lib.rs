//! TwinTone generation crate - backend abstraction, OpenAI-compatible and
//! mock backends, retry policy and the resilient generation client.

pub mod backend;
pub mod client;
pub mod error;
pub mod mock;
pub mod openai;
pub mod retry;

pub use backend::GenerationBackend;
pub use client::GenerationClient;
pub use error::{GenerationError, GenerationErrorKind};
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use retry::{execute_with_retry, RetryPolicy};
