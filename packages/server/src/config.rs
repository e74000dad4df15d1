//! Server configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum, builder::RangedU64ValueParser};

use crate::{
    infrastructure::identity::DEFAULT_COOKIE_NAME,
    usecase::{
        BackpressurePolicy, DEFAULT_OUTBOUND_BUFFER, HubConfig,
        hub::{DEFAULT_INBOUND_BUFFER, DEFAULT_SEND_TIMEOUT},
    },
};

/// How the hub reacts to a member whose outbound queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackpressureMode {
    /// Wait for the member; a slow client stalls the whole room
    Block,
    /// Wait up to the send timeout, then disconnect the member
    Disconnect,
}

/// Command line configuration for the chat server
#[derive(Debug, Clone, Parser)]
#[command(name = "agora-server", version, about = "Broadcast hub chat server")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Capacity of each client's outbound queue
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub outbound_buffer: usize,

    /// Capacity of the hub's inbound queue
    #[arg(long, default_value_t = DEFAULT_INBOUND_BUFFER, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub inbound_buffer: usize,

    /// Policy for clients that do not keep up
    #[arg(long, value_enum, default_value_t = BackpressureMode::Disconnect)]
    pub backpressure: BackpressureMode,

    /// Enqueue timeout in milliseconds for the disconnect policy
    #[arg(long, default_value_t = DEFAULT_SEND_TIMEOUT.as_millis() as u64, value_parser = RangedU64ValueParser::<u64>::new().range(1..))]
    pub send_timeout_ms: u64,

    /// Cookie carrying the client's display name
    #[arg(long, default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            inbound_buffer: DEFAULT_INBOUND_BUFFER,
            backpressure: BackpressureMode::Disconnect,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT.as_millis() as u64,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            log_level: "debug".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn backpressure_policy(&self) -> BackpressurePolicy {
        match self.backpressure {
            BackpressureMode::Block => BackpressurePolicy::Block,
            BackpressureMode::Disconnect => BackpressurePolicy::Disconnect {
                timeout: Duration::from_millis(self.send_timeout_ms),
            },
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            inbound_buffer: self.inbound_buffer,
            backpressure: self.backpressure_policy(),
        }
    }
}
