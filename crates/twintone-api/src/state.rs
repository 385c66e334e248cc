//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use twintone_core::config::TwinToneConfig;

use crate::gateway::RequestGateway;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, fixed at startup.
    pub config: Arc<TwinToneConfig>,
    /// Validation, orchestration and persistence for every operation.
    pub gateway: Arc<RequestGateway>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: TwinToneConfig, gateway: RequestGateway) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            start_time: Instant::now(),
        }
    }
}
