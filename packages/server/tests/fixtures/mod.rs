//! Test fixtures: an in-process server and WebSocket client helpers.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use agora_server::{ServerConfig, serve};
use futures_util::StreamExt;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message, client::IntoClientRequest, http::HeaderValue},
};

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Server running on an ephemeral port for the lifetime of the value
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let task = tokio::spawn(async move {
            let _ = serve(listener, config, std::future::pending()).await;
        });
        Self { addr, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/room", self.addr)
    }

    /// Open a WebSocket connection authenticated as `name`
    pub async fn connect(&self, name: &str) -> WsClient {
        let mut request = self
            .ws_url()
            .into_client_request()
            .expect("Failed to build request");
        request.headers_mut().insert(
            "Cookie",
            HeaderValue::from_str(&format!("auth={name}")).expect("Invalid cookie"),
        );
        let (stream, _) = connect_async(request)
            .await
            .expect("Failed to connect WebSocket");
        stream
    }

    /// Current room state from the HTTP API
    pub async fn room_state(&self) -> serde_json::Value {
        reqwest::get(format!("{}/api/room", self.base_url()))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON")
    }

    /// Poll the room state until it has `count` members
    pub async fn wait_for_members(&self, count: u64) {
        for _ in 0..100 {
            if self.room_state().await["count"] == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("room never reached {count} member(s)");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn chat(body: &str) -> Message {
    Message::Text(serde_json::json!({ "Message": body }).to_string().into())
}

/// Next chat frame as JSON, skipping control frames
pub async fn next_chat(client: &mut WsClient) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("WebSocket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Read until the server closes the connection, returning the chat bodies seen
pub async fn drain_until_closed(client: &mut WsClient) -> Vec<String> {
    let mut bodies = Vec::new();
    loop {
        let frame = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .expect("timed out waiting for close");
        match frame {
            Some(Ok(Message::Text(text))) => {
                let value: serde_json::Value =
                    serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
                bodies.push(value["Message"].as_str().unwrap_or_default().to_string());
            }
            Some(Ok(Message::Close(_))) | None => return bodies,
            Some(Ok(_)) => continue,
            Some(Err(tungstenite::Error::ConnectionClosed))
            | Some(Err(tungstenite::Error::AlreadyClosed)) => return bodies,
            Some(Err(tungstenite::Error::Protocol(_))) => return bodies,
            Some(Err(e)) => panic!("WebSocket error: {e}"),
        }
    }
}
