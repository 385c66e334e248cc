//! TwinTone core crate - shared types, error taxonomy, configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::TwinToneConfig;
pub use error::{Result, TwinToneError};
pub use types::*;
