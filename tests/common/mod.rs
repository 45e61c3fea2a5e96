//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crud_cluster::config::ClusterConfig;
use crud_cluster::http::GatewayServer;
use crud_cluster::lifecycle::{Shutdown, ShutdownOutcome};
use crud_cluster::load_balancer::WorkerPool;
use crud_cluster::net::{self, ListenerError};

/// Config bound to loopback, dialing workers on loopback.
pub fn test_config(base_port: u16) -> ClusterConfig {
    let mut config = ClusterConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = base_port;
    config.pool.upstream_host = "127.0.0.1".to_string();
    config
}

/// A running gateway and its controls.
pub struct TestGateway {
    pub shutdown: Shutdown,
    pub pool: std::sync::Arc<WorkerPool>,
    pub task: JoinHandle<Result<ShutdownOutcome, ListenerError>>,
}

/// Start a gateway on `config.listener.port` for `workers` consecutive ports.
pub async fn start_gateway(config: &ClusterConfig, workers: usize) -> TestGateway {
    let pool = WorkerPool::from_base_port(config.listener.port, workers).unwrap();
    let server = GatewayServer::new(config, pool);
    let pool = server.pool();

    let listener = net::bind(&config.listener.host, config.listener.port)
        .await
        .unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let task = tokio::spawn(async move { server.run(listener, &server_shutdown).await });

    TestGateway { shutdown, pool, task }
}

/// Start an Axum backend that describes each request it receives.
///
/// - `/status/{code}` answers with that status
/// - `/slow/{ms}` sleeps before answering
/// - every response carries `x-worker: <name>`
pub async fn start_echo_worker(port: u16, name: &str) {
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let app = Router::new()
        .fallback(echo)
        .layer(DefaultBodyLimit::disable())
        .with_state(name.to_string());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
}

async fn echo(State(name): State<String>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path();

    if let Some(ms) = path.strip_prefix("/slow/").and_then(|ms| ms.parse().ok()) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    let status = path
        .strip_prefix("/status/")
        .and_then(|code| code.parse().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);

    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_str().unwrap_or_default().to_string())))
        .collect();

    (
        status,
        [("x-worker", name.clone())],
        Json(json!({
            "worker": name,
            "method": parts.method.as_str(),
            "uri": parts.uri.to_string(),
            "headers": headers,
            "body_len": body.len(),
        })),
    )
        .into_response()
}

/// Start a backend whose handler never answers in time.
///
/// `dropped` is set once the in-flight handler future is dropped, which
/// happens when the caller's connection goes away.
pub async fn start_stalled_worker(port: u16, dropped: Arc<AtomicBool>) {
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let app = Router::new().fallback(stall).with_state(dropped);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

async fn stall(State(dropped): State<Arc<AtomicBool>>) -> StatusCode {
    let _flag = DropFlag(dropped);
    tokio::time::sleep(Duration::from_secs(20)).await;
    StatusCode::OK
}

/// Start a raw TCP backend that answers every request with the same body
/// and closes the connection.
pub async fn start_mock_backend(port: u16, response: &'static str) {
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                // Consume the request head so closing does not reset the connection.
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let response_str = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.len(),
                    response
                );
                let _ = socket.write_all(response_str.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
}

/// Wait until something accepts connections on `port`.
pub async fn wait_for_port(port: u16) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while tokio::time::Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("nothing listening on port {port}");
}

/// Client that opens a fresh connection per request.
pub fn fresh_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
