//! HTTP API response DTOs for the chat application.

use serde::{Deserialize, Serialize};

/// Current room membership for the room state endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStateDto {
    pub count: usize,
    pub members: Vec<MemberDto>,
}

/// Member detail for the room state endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDto {
    pub connection_id: String,
    pub name: String,
    pub joined_at: String, // ISO 8601
}
