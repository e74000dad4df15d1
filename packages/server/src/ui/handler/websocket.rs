//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;

use crate::{
    domain::{ClientName, IdentityExtractor},
    ui::state::AppState,
    usecase::{Connection, HubHandle},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let name = authorize(state.identity.as_ref(), &headers)?;
    tracing::info!("Client '{}' upgrading to WebSocket", name);

    let hub = state.hub.clone();
    let outbound_buffer = state.outbound_buffer;
    Ok(ws
        .on_failed_upgrade(|e: axum::Error| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, hub, name, outbound_buffer))
        .into_response())
}

/// Resolve the client name, rejecting the request if there is none.
fn authorize(
    identity: &dyn IdentityExtractor,
    headers: &HeaderMap,
) -> Result<ClientName, StatusCode> {
    identity.extract(headers).map_err(|e| {
        tracing::warn!("Rejecting connection: {}", e);
        StatusCode::UNAUTHORIZED
    })
}

async fn handle_socket(
    socket: WebSocket,
    hub: HubHandle,
    name: ClientName,
    outbound_buffer: usize,
) {
    let (sender, receiver) = socket.split();
    let connection = Connection::new(name, hub, outbound_buffer);
    connection.run(sender, receiver).await;
}
