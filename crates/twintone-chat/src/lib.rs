//! Dual-tone orchestration for TwinTone.
//!
//! Builds the casual and formal prompts for a query and drives both
//! generations concurrently through a shared [`GenerationClient`].
//!
//! [`GenerationClient`]: twintone_generation::GenerationClient

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::ToneOrchestrator;
pub use prompt::{initial_prompt, refine_prompt};
