//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{domain::IdentityExtractor, usecase::HubHandle};

/// Shared application state
pub struct AppState {
    /// Handle to the room's broadcast hub
    pub hub: HubHandle,
    /// Resolves the client name of an incoming connection
    pub identity: Arc<dyn IdentityExtractor>,
    /// Capacity of each new client's outbound queue
    pub outbound_buffer: usize,
}
