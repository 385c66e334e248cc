//! Route handler implementations for all API endpoints.
//!
//! Handlers translate JSON to and from the [`RequestGateway`]; no
//! validation or business logic lives here.
//!
//! [`RequestGateway`]: crate::gateway::RequestGateway

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use twintone_core::types::ConversationRecord;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Generate endpoint
// =============================================================================

/// Request body for POST /generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
    pub user_id: String,
}

/// Response body for POST /generate.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: i64,
    pub conversation_id: Uuid,
    pub user_id: String,
    pub query: String,
    pub casual: String,
    pub formal: String,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationRecord> for GenerateResponse {
    fn from(record: ConversationRecord) -> Self {
        Self {
            id: record.id,
            conversation_id: record.conversation_id,
            user_id: record.user_id,
            query: record.query,
            casual: record.casual_response,
            formal: record.formal_response,
            created_at: record.created_at,
        }
    }
}

/// POST /generate - produce casual and formal answers and store them.
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let record = state.gateway.generate(&req.query, &req.user_id).await?;
    Ok(Json(record.into()))
}

// =============================================================================
// History endpoints
// =============================================================================

/// Query parameters for GET /history/{user_id}.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /history/{user_id} - a page of the user's conversations, newest first.
pub async fn history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<ConversationRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let records = state
        .gateway
        .history(&user_id, params.limit, params.offset)
        .await?;
    Ok(Json(records))
}

/// Response body for GET /users.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub user_ids: Vec<String>,
}

/// GET /users - every user with at least one conversation.
pub async fn users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let user_ids = state.gateway.users().await?;
    Ok(Json(UsersResponse { user_ids }))
}

// =============================================================================
// Health endpoint
// =============================================================================

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub total_conversations: u64,
    pub provider: String,
}

/// GET /health - liveness plus a few counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let total_conversations = match state.gateway.total_conversations().await {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %e, "Failed to count conversations for health check");
            0
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_conversations,
        provider: state.gateway.provider().to_string(),
    })
}
