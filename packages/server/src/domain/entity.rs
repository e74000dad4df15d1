//! Core domain models for the broadcast hub.

use super::value_object::{ClientName, Timestamp};

/// A chat message accepted by the hub.
///
/// Built by the connection reader from the decoded body, the connection's
/// own name and the receive time; never mutated afterwards. Fan-out shares
/// one instance between all outbound queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Name of the client the message came from
    pub sender: ClientName,
    /// Message body as sent by the client
    pub body: String,
    /// Time the server received the message
    pub timestamp: Timestamp,
}

impl Message {
    /// Create a new message
    pub fn new(sender: ClientName, body: String, timestamp: Timestamp) -> Self {
        Self {
            sender,
            body,
            timestamp,
        }
    }
}
