//! UseCase layer error definitions.

use thiserror::Error;

/// Errors returned by [`HubHandle`](super::HubHandle) requests
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub task is no longer running
    #[error("broadcast hub has stopped")]
    Stopped,
}

/// Errors that end a single client connection.
///
/// These are contained at the connection boundary: the hub and every other
/// client keep running.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Reading from or writing to the transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// An inbound frame could not be decoded
    #[error("failed to decode inbound frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outbound message could not be encoded
    #[error("failed to encode outbound message: {0}")]
    Encode(#[source] serde_json::Error),

    /// The hub rejected a request
    #[error(transparent)]
    Hub(#[from] HubError),
}
