//! Per-client connection lifecycle.
//!
//! A connection is admitted to the hub, then runs two loops: the reader turns
//! inbound frames into messages for the hub, the writer drains the client's
//! outbound queue onto the transport. Termination propagates structurally:
//!
//! ```text
//! reader exits -> leave -> hub closes outbound queue -> writer exits -> transport closed
//! ```
//!
//! If the writer exits first (queue closed by an eviction, or a write error)
//! the reader is dropped and the same teardown runs.
//!
//! The loops are generic over `Stream` / `Sink` of WebSocket frames so they
//! can be driven without a socket.

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::extract::ws::Message as Frame;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ClientName, ConnectionId, Message, Timestamp},
    infrastructure::dto::websocket::{ChatMessage, InboundChatMessage},
};

use super::{
    error::{ClientError, HubError},
    hub::{HubHandle, Member},
};

/// Default capacity of each client's outbound queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;

/// How long teardown waits for the writer to flush queued messages once the
/// reader has exited. A peer that stopped reading is cut off after this.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Waiting for the hub to admit the client
    Connecting,
    /// Member of the hub, both loops running
    Active,
    /// One loop has exited, tearing down
    Closing,
    /// Both loops done and the transport released
    Closed,
}

/// Read inbound frames and forward each decoded message to the hub.
///
/// Returns `Ok(())` when the peer closes the connection or the stream ends.
///
/// # Errors
///
/// Returns an error on a transport failure, an undecodable frame, or if the
/// hub has stopped. The caller tears down this connection only.
pub async fn read_loop<S, E>(
    stream: &mut S,
    name: &ClientName,
    hub: &HubHandle,
) -> Result<(), ClientError>
where
    S: Stream<Item = Result<Frame, E>> + Unpin + Send,
    E: Display + Send,
{
    while let Some(frame) = stream.next().await {
        let frame = frame.map_err(|e| ClientError::Transport(e.to_string()))?;
        let body = match frame {
            Frame::Text(text) => {
                InboundChatMessage::decode_body(text.as_bytes()).map_err(ClientError::Decode)?
            }
            Frame::Binary(bytes) => {
                InboundChatMessage::decode_body(&bytes).map_err(ClientError::Decode)?
            }
            Frame::Close(close) => {
                match close {
                    Some(close) => tracing::info!(
                        "Client '{}' requested close (code {}, reason '{}')",
                        name,
                        close.code,
                        close.reason.as_str()
                    ),
                    None => tracing::info!("Client '{}' requested close", name),
                }
                return Ok(());
            }
            // Pings are answered by the protocol layer
            Frame::Ping(_) | Frame::Pong(_) => continue,
        };

        let message = Message::new(name.clone(), body, Timestamp::now());
        tracing::debug!("Received message from '{}': {}", name, message.body);
        hub.forward(message).await?;
    }

    tracing::debug!("Inbound stream for '{}' ended", name);
    Ok(())
}

/// Write every message from the outbound queue to the transport.
///
/// Returns `Ok(())` once the hub has closed the queue and it is drained.
///
/// # Errors
///
/// Returns an error if a message cannot be encoded or written.
pub async fn write_loop<K>(
    sink: &mut K,
    outbound: &mut mpsc::Receiver<Arc<Message>>,
) -> Result<(), ClientError>
where
    K: Sink<Frame> + Unpin + Send,
    K::Error: Display,
{
    while let Some(message) = outbound.recv().await {
        let json = ChatMessage::encode(&message).map_err(ClientError::Encode)?;
        sink.send(Frame::Text(json.into()))
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
    }
    Ok(())
}

/// Issues a leave for the connection when dropped, unless one was already sent.
struct LeaveGuard {
    hub: HubHandle,
    id: ConnectionId,
    armed: bool,
}

impl LeaveGuard {
    fn new(hub: HubHandle, id: ConnectionId) -> Self {
        Self {
            hub,
            id,
            armed: true,
        }
    }

    async fn leave(mut self) -> Result<bool, HubError> {
        self.armed = false;
        self.hub.leave(self.id).await
    }
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.hub.leave_detached(self.id);
        }
    }
}

/// One client connection, from admission to release.
pub struct Connection {
    id: ConnectionId,
    name: ClientName,
    hub: HubHandle,
    outbound_buffer: usize,
    drain_timeout: Duration,
    state: ClientState,
}

impl Connection {
    pub fn new(name: ClientName, hub: HubHandle, outbound_buffer: usize) -> Self {
        Self {
            id: ConnectionId::generate(),
            name,
            hub,
            outbound_buffer: outbound_buffer.max(1),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            state: ClientState::Connecting,
        }
    }

    /// Override how long teardown waits for the writer to drain.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    fn transition(&mut self, next: ClientState) {
        tracing::debug!(
            "Client '{}' ({}): {:?} -> {:?}",
            self.name,
            self.id,
            self.state,
            next
        );
        self.state = next;
    }

    /// Join the hub and run the reader and writer until the connection ends.
    ///
    /// Errors are logged and contained here; the returned state is always
    /// [`ClientState::Closed`].
    pub async fn run<K, S, E>(mut self, mut sink: K, mut stream: S) -> ClientState
    where
        K: Sink<Frame> + Unpin + Send + 'static,
        K::Error: Display,
        S: Stream<Item = Result<Frame, E>> + Unpin + Send,
        E: Display + Send,
    {
        let (outbound_tx, mut outbound_rx) = mpsc::channel(self.outbound_buffer);
        let member = Member::new(self.id, self.name.clone(), outbound_tx);

        if let Err(e) = self.hub.join(member).await {
            tracing::warn!("Client '{}' could not join: {}", self.name, e);
            self.transition(ClientState::Closing);
            close_sink(&mut sink, &self.name).await;
            self.transition(ClientState::Closed);
            return self.state;
        }
        self.transition(ClientState::Active);

        let guard = LeaveGuard::new(self.hub.clone(), self.id);

        let writer_name = self.name.clone();
        let mut writer = tokio::spawn(async move {
            let result = write_loop(&mut sink, &mut outbound_rx).await;
            // Dropping the receiver lets a blocked hub move past this member.
            drop(outbound_rx);
            if let Err(e) = &result {
                tracing::warn!("Writer for '{}' failed: {}", writer_name, e);
            }
            sink
        });

        let name = self.name.clone();
        let hub = self.hub.clone();
        let writer_finished = tokio::select! {
            result = read_loop(&mut stream, &name, &hub) => {
                if let Err(e) = result {
                    tracing::warn!("Reader for '{}' failed: {}", name, e);
                }
                None
            }
            joined = &mut writer => Some(joined),
        };
        self.transition(ClientState::Closing);

        match guard.leave().await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Client '{}' was already removed", self.name),
            Err(e) => tracing::warn!("Leave for '{}' failed: {}", self.name, e),
        }

        let joined = match writer_finished {
            Some(joined) => Some(joined),
            None => match tokio::time::timeout(self.drain_timeout, &mut writer).await {
                Ok(joined) => Some(joined),
                Err(_) => {
                    tracing::warn!(
                        "Writer for '{}' did not drain within {:?}, dropping transport",
                        self.name,
                        self.drain_timeout
                    );
                    // Aborting drops the sink half; the stream half goes with `run`.
                    writer.abort();
                    None
                }
            },
        };
        match joined {
            Some(Ok(mut sink)) => close_sink(&mut sink, &self.name).await,
            Some(Err(e)) => tracing::error!("Writer task for '{}' aborted: {}", self.name, e),
            None => {}
        }

        self.transition(ClientState::Closed);
        tracing::info!("Client '{}' ({}) disconnected", self.name, self.id);
        self.state
    }
}

/// Close the transport. A transport that is already closed is fine.
async fn close_sink<K>(sink: &mut K, name: &ClientName)
where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    if let Err(e) = sink.close().await {
        tracing::debug!("Transport for '{}' already closed: {}", name, e);
    }
}
