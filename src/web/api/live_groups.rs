//! Live group status
//!
//! Point-in-time view of which videos have viewers connected, in the same
//! spirit as the log streaming stats endpoint: counts only, no payloads.

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::errors::AppResult;
use crate::services::GroupSummary;
use crate::web::{AppState, responses::ApiResponse};

#[derive(Debug, Serialize)]
pub struct LiveGroupsResponse {
    pub groups: Vec<GroupSummary>,
    pub total_sessions: usize,
    pub tracked_videos: usize,
}

/// List live groups and their session counts
pub async fn list_live_groups(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let groups = state.engagement.registry().groups();
    let total_sessions = groups.iter().map(|group| group.sessions).sum();
    let tracked_videos = state.engagement.store().video_count().await?;

    Ok(axum::Json(ApiResponse::success(LiveGroupsResponse {
        groups,
        total_sessions,
        tracked_videos,
    })))
}
