//! Health check HTTP handlers

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
}

/// Liveness of the process, independent of any viewer traffic
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_seconds = (chrono::Utc::now() - state.start_time).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds,
    })
}
