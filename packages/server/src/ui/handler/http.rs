//! HTTP API endpoint handlers.

use std::sync::Arc;

use agora_shared::time::timestamp_to_rfc3339;
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::http::{MemberDto, RoomStateDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current members of the room
pub async fn room_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomStateDto>, StatusCode> {
    let members = state.hub.members().await.map_err(|e| {
        tracing::error!("Failed to read room state: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    let mut members: Vec<MemberDto> = members
        .into_iter()
        .map(|member| MemberDto {
            connection_id: member.id.to_string(),
            name: member.name.into_string(),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
        })
        .collect();
    // Sort by name for consistent ordering
    members.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(RoomStateDto {
        count: members.len(),
        members,
    }))
}
