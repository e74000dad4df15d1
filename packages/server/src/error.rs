//! Server error definitions.

use thiserror::Error;

/// Errors that stop the server as a whole
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server failed while running
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
