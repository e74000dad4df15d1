//! Broadcast hub.
//!
//! The hub task is the only owner of room membership. Connections never touch
//! the member set; they send join, leave and forward requests through
//! [`HubHandle`] and the hub applies them one at a time in its event loop.
//! This serialization is what makes fan-out race-free without a lock.
//!
//! Each member's outbound queue is closed by dropping the hub's sender for it.
//! The hub holds the only sender, so removal closes the queue exactly once and
//! a repeated leave for an absent member is a no-op.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{mpsc, oneshot};

use crate::domain::{ClientName, ConnectionId, Message, Timestamp};

use super::error::HubError;

/// Default capacity of the hub's inbound queue
pub const DEFAULT_INBOUND_BUFFER: usize = 256;

/// Default per-member enqueue timeout under [`BackpressurePolicy::Disconnect`]
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Join requests are acknowledged, so a small buffer is enough.
const JOIN_BUFFER: usize = 16;
const QUERY_BUFFER: usize = 16;

/// What the hub does when a member's outbound queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackpressurePolicy {
    /// Wait until the member has room.
    ///
    /// One slow consumer stalls delivery to the whole room until it drains.
    Block,
    /// Wait at most `timeout`, then evict the member and close its queue.
    Disconnect { timeout: Duration },
}

impl Default for BackpressurePolicy {
    fn default() -> Self {
        Self::Disconnect {
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

/// Hub construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    pub inbound_buffer: usize,
    pub backpressure: BackpressurePolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            inbound_buffer: DEFAULT_INBOUND_BUFFER,
            backpressure: BackpressurePolicy::default(),
        }
    }
}

/// Sending half of a member's outbound queue
pub type Outbound = mpsc::Sender<Arc<Message>>;

/// A client admitted (or asking to be admitted) to the hub.
#[derive(Debug)]
pub struct Member {
    pub id: ConnectionId,
    pub name: ClientName,
    pub joined_at: Timestamp,
    outbound: Outbound,
}

impl Member {
    pub fn new(id: ConnectionId, name: ClientName, outbound: Outbound) -> Self {
        Self {
            id,
            name,
            joined_at: Timestamp::now(),
            outbound,
        }
    }
}

/// Read-only view of a member, as reported by [`HubHandle::members`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub id: ConnectionId,
    pub name: ClientName,
    pub joined_at: Timestamp,
}

struct JoinRequest {
    member: Member,
    ack: oneshot::Sender<()>,
}

struct LeaveRequest {
    id: ConnectionId,
    ack: Option<oneshot::Sender<bool>>,
}

type MembersQuery = oneshot::Sender<Vec<MemberInfo>>;

/// Cloneable handle used to talk to a running hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    joins: mpsc::Sender<JoinRequest>,
    leaves: mpsc::UnboundedSender<LeaveRequest>,
    inbound: mpsc::Sender<Message>,
    queries: mpsc::Sender<MembersQuery>,
}

impl HubHandle {
    /// Admit a member.
    ///
    /// Returns once the hub has added the member; every message forwarded
    /// after that point is delivered to it.
    pub async fn join(&self, member: Member) -> Result<(), HubError> {
        let (ack, done) = oneshot::channel();
        self.joins
            .send(JoinRequest { member, ack })
            .await
            .map_err(|_| HubError::Stopped)?;
        done.await.map_err(|_| HubError::Stopped)
    }

    /// Remove a member and close its outbound queue.
    ///
    /// Returns `true` if the id was still a member. Once this returns no
    /// further message reaches the member's queue.
    pub async fn leave(&self, id: ConnectionId) -> Result<bool, HubError> {
        let (ack, done) = oneshot::channel();
        self.leaves
            .send(LeaveRequest { id, ack: Some(ack) })
            .map_err(|_| HubError::Stopped)?;
        done.await.map_err(|_| HubError::Stopped)
    }

    /// Request removal without waiting for the hub. Usable from `Drop`.
    pub fn leave_detached(&self, id: ConnectionId) -> Result<(), HubError> {
        self.leaves
            .send(LeaveRequest { id, ack: None })
            .map_err(|_| HubError::Stopped)
    }

    /// Submit a message for delivery to every current member.
    pub async fn forward(&self, message: Message) -> Result<(), HubError> {
        self.inbound
            .send(message)
            .await
            .map_err(|_| HubError::Stopped)
    }

    /// Snapshot of the current members.
    pub async fn members(&self) -> Result<Vec<MemberInfo>, HubError> {
        let (reply, response) = oneshot::channel();
        self.queries
            .send(reply)
            .await
            .map_err(|_| HubError::Stopped)?;
        response.await.map_err(|_| HubError::Stopped)
    }
}

/// The hub event loop and the membership it owns.
pub struct Hub {
    members: HashMap<ConnectionId, Member>,
    joins: mpsc::Receiver<JoinRequest>,
    leaves: mpsc::UnboundedReceiver<LeaveRequest>,
    inbound: mpsc::Receiver<Message>,
    queries: mpsc::Receiver<MembersQuery>,
    backpressure: BackpressurePolicy,
}

impl Hub {
    /// Create a hub and the handle that drives it. The hub does nothing until
    /// [`Hub::run`] is polled.
    pub fn new(config: HubConfig) -> (Self, HubHandle) {
        let (joins_tx, joins) = mpsc::channel(JOIN_BUFFER);
        let (leaves_tx, leaves) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::channel(config.inbound_buffer.max(1));
        let (queries_tx, queries) = mpsc::channel(QUERY_BUFFER);

        let hub = Self {
            members: HashMap::new(),
            joins,
            leaves,
            inbound,
            queries,
            backpressure: config.backpressure,
        };
        let handle = HubHandle {
            joins: joins_tx,
            leaves: leaves_tx,
            inbound: inbound_tx,
            queries: queries_tx,
        };
        (hub, handle)
    }

    /// Create a hub and run it on a background task.
    pub fn spawn(config: HubConfig) -> HubHandle {
        let (hub, handle) = Self::new(config);
        tokio::spawn(hub.run());
        handle
    }

    /// Run the event loop until every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        tracing::info!(backpressure = ?self.backpressure, "Broadcast hub started");

        loop {
            tokio::select! {
                Some(request) = self.joins.recv() => self.handle_join(request),
                Some(request) = self.leaves.recv() => self.handle_leave(request),
                Some(message) = self.inbound.recv() => self.handle_forward(message).await,
                Some(reply) = self.queries.recv() => {
                    let _ = reply.send(self.snapshot());
                }
                else => break,
            }
        }

        tracing::info!("All hub handles dropped, broadcast hub stopped");
    }

    fn handle_join(&mut self, request: JoinRequest) {
        let JoinRequest { member, ack } = request;
        tracing::info!(
            "Client '{}' ({}) joined, {} member(s)",
            member.name,
            member.id,
            self.members.len() + 1
        );
        self.members.insert(member.id, member);
        // The joiner may have given up waiting; membership stands regardless.
        let _ = ack.send(());
    }

    fn handle_leave(&mut self, request: LeaveRequest) {
        // Removing the member drops the only sender, which closes its queue.
        let was_member = match self.members.remove(&request.id) {
            Some(member) => {
                tracing::info!(
                    "Client '{}' ({}) left, {} member(s)",
                    member.name,
                    member.id,
                    self.members.len()
                );
                true
            }
            None => {
                tracing::debug!("Leave for {} ignored, not a member", request.id);
                false
            }
        };
        if let Some(ack) = request.ack {
            let _ = ack.send(was_member);
        }
    }

    async fn handle_forward(&mut self, message: Message) {
        let message = Arc::new(message);
        tracing::debug!(
            "Forwarding message from '{}' to {} member(s)",
            message.sender,
            self.members.len()
        );

        let mut evicted = Vec::new();
        for member in self.members.values() {
            if let Err(reason) = self.deliver(member, &message).await {
                tracing::warn!(
                    "Evicting client '{}' ({}): {}",
                    member.name,
                    member.id,
                    reason
                );
                evicted.push(member.id);
            }
        }

        for id in evicted {
            self.members.remove(&id);
        }
    }

    async fn deliver(&self, member: &Member, message: &Arc<Message>) -> Result<(), &'static str> {
        let send = member.outbound.send(Arc::clone(message));
        match self.backpressure {
            BackpressurePolicy::Block => send.await.map_err(|_| "outbound queue closed"),
            BackpressurePolicy::Disconnect { timeout } => {
                match tokio::time::timeout(timeout, send).await {
                    Ok(result) => result.map_err(|_| "outbound queue closed"),
                    Err(_) => Err("outbound queue full past send timeout"),
                }
            }
        }
    }

    fn snapshot(&self) -> Vec<MemberInfo> {
        self.members
            .values()
            .map(|member| MemberInfo {
                id: member.id,
                name: member.name.clone(),
                joined_at: member.joined_at,
            })
            .collect()
    }
}
