//! TwinTone API crate - request gateway and axum HTTP server.
//!
//! Exposes dual-tone generation, per-user history, the user list and a
//! health check over JSON.

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use gateway::{GenerateStage, RequestGateway};
pub use routes::{create_router, start_server};
pub use state::AppState;
