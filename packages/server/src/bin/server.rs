//! Broadcast hub chat server.
//!
//! Every message a client sends is delivered to all connected clients,
//! including the sender.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server -- --port 8080
//! ```

use agora_server::ServerConfig;
use agora_shared::logger::setup_logger;
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = agora_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
