//! Broadcast hub chat server.
//!
//! Clients connect over WebSocket, send chat messages, and receive every
//! message sent by any connected client in the order the hub observes them.
//! The [`usecase::Hub`] task is the single owner of room membership; each
//! connection talks to it only through a [`usecase::HubHandle`].

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::{run as run_server, serve};
