//! WebSocket message DTOs for the chat application.
//!
//! Frames are JSON objects with capitalised keys:
//!
//! ```text
//! {"Name": "alice", "Message": "hi", "Time": 1700000000}
//! ```
//!
//! Clients only need to send `Message`. `Name` and `Time` are always
//! restamped by the server.

use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// Chat message sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatMessage {
    pub name: String,
    pub message: String,
    /// Unix timestamp (seconds)
    pub time: i64,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            name: message.sender.as_str().to_string(),
            message: message.body.clone(),
            time: message.timestamp.value(),
        }
    }
}

impl ChatMessage {
    /// Encode a domain message as an outbound JSON frame.
    pub fn encode(message: &Message) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Self::from(message))
    }
}

/// Chat message received from a client
#[derive(Debug, Clone, Deserialize)]
pub struct InboundChatMessage {
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl InboundChatMessage {
    /// Decode an inbound JSON frame and return its body.
    pub fn decode_body(frame: &[u8]) -> Result<String, serde_json::Error> {
        serde_json::from_slice::<Self>(frame).map(|inbound| inbound.message)
    }
}
