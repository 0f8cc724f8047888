//! Health check endpoint for service monitoring.

use crate::{error::AppError, state::AppState};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
///
/// Returns service status and store readability.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Store status
    pub store: String,

    /// Number of keys currently known
    pub keys: usize,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Checks
///
/// - The key set can be read and parsed
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "store": "readable",
///   "keys": 12,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let keys = state.store.read().await.keys()?.len();

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        store: "readable".to_string(),
        keys,
        timestamp: Utc::now(),
    }))
}
