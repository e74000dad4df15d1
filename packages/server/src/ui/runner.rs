//! Server runner: wires the hub, the router and the listener together.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::CookieIdentityExtractor,
    ui::{
        handler::{health_check, room_state, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
    usecase::Hub,
};

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/room", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/room", get(room_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let hub = Hub::spawn(config.hub_config());
    let state = Arc::new(AppState {
        hub,
        identity: Arc::new(CookieIdentityExtractor::new(config.cookie_name.clone())),
        outbound_buffer: config.outbound_buffer,
    });
    let app = build_router(state);

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Listening on {}", addr),
        Err(e) => tracing::warn!("Listening on unknown address: {}", e),
    }
    tracing::info!(
        "WebSocket endpoint: /room (backpressure: {:?}, outbound buffer: {})",
        config.backpressure_policy(),
        config.outbound_buffer
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}
