//! Gateway HTTP server.
//!
//! # Responsibilities
//! - Accept all external traffic on the base port
//! - Pick a worker per request (round-robin)
//! - Stream the request to the worker and the response back
//! - Turn any upstream failure into a JSON 500, without retrying
//!
//! # Design Decisions
//! - Bodies are never buffered: the inbound body is the upstream body and the
//!   upstream body is the outbound body
//! - A client that disconnects drops the handler future, which drops the
//!   upstream request or body and closes that connection

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Uri, Version},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ClusterConfig;
use crate::http::{request, response};
use crate::lifecycle::{Shutdown, ShutdownOutcome};
use crate::load_balancer::WorkerPool;
use crate::net::{self, connection::track_in_flight, InFlightTracker, ListenerError};
use crate::observability::metrics;
use crate::security::headers;

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct GatewayState {
    pub pool: Arc<WorkerPool>,
    pub client: Client<HttpConnector, Body>,
    pub upstream_host: Arc<str>,
    pub response_timeout: Duration,
}

/// Reverse proxy in front of the worker pool.
pub struct GatewayServer {
    router: Router,
    pool: Arc<WorkerPool>,
    in_flight: InFlightTracker,
    grace: Duration,
}

impl GatewayServer {
    /// Create a gateway forwarding to `pool`.
    pub fn new(config: &ClusterConfig, pool: WorkerPool) -> Self {
        let pool = Arc::new(pool);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.timeouts.upstream_connect()));
        connector.set_nodelay(true);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = GatewayState {
            pool: pool.clone(),
            client,
            upstream_host: Arc::from(config.pool.upstream_host.as_str()),
            response_timeout: config.timeouts.upstream_response(),
        };

        let in_flight = InFlightTracker::new();
        let router = Self::build_router(state, in_flight.clone());

        Self {
            router,
            pool,
            in_flight,
            grace: config.timeouts.shutdown_grace(),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: GatewayState, in_flight: InFlightTracker) -> Router {
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(in_flight, track_in_flight));

        request::with_request_id(router).layer(TraceLayer::new_for_http())
    }

    /// Shared handle to the pool, for inspecting the dispatch cursor.
    pub fn pool(&self) -> Arc<WorkerPool> {
        self.pool.clone()
    }

    /// Run the gateway until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: &Shutdown,
    ) -> Result<ShutdownOutcome, ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Serve)?;
        tracing::info!(
            address = %addr,
            workers = self.pool.len(),
            "Load balancer running"
        );

        let in_flight = self.in_flight.clone();
        let outcome = net::serve_with_grace(listener, self.router, shutdown, self.grace).await?;

        tracing::info!(
            outcome = ?outcome,
            abandoned = in_flight.active_count(),
            "Load balancer closed"
        );
        Ok(outcome)
    }
}

/// Main proxy handler.
/// Selects a worker and forwards the request to it.
async fn proxy_handler(
    State(state): State<GatewayState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let worker = state.pool.select_worker();
    let worker_label = worker.index.to_string();
    metrics::record_dispatch(&worker_label);

    let (mut parts, body) = request.into_parts();
    let request_id = request::request_id(&parts.headers).to_string();
    let method = parts.method.clone();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tracing::info!(
        request_id = %request_id,
        worker = worker.index,
        port = worker.port,
        method = %method,
        path = %path_and_query,
        "Forwarding request to worker"
    );

    let uri = match Uri::try_from(format!(
        "{}{}",
        worker.origin(&state.upstream_host),
        path_and_query
    )) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Invalid upstream URI");
            metrics::record_request(method.as_str(), 500, &worker_label, start_time);
            return response::forward_failure();
        }
    };

    parts.uri = uri;
    parts.version = Version::HTTP_11;
    headers::strip_hop_by_hop(&mut parts.headers);
    headers::append_forwarded_for(&mut parts.headers, peer.ip());

    let upstream_request = Request::from_parts(parts, body);

    match tokio::time::timeout(state.response_timeout, state.client.request(upstream_request)).await {
        Ok(Ok(upstream_response)) => {
            let status = upstream_response.status();
            metrics::record_request(method.as_str(), status.as_u16(), &worker_label, start_time);
            tracing::debug!(
                request_id = %request_id,
                worker = worker.index,
                status = %status,
                "Worker responded"
            );

            into_downstream(upstream_response)
        }
        Ok(Err(e)) => {
            tracing::error!(
                request_id = %request_id,
                worker = worker.index,
                port = worker.port,
                error = %e,
                "Error forwarding request"
            );
            metrics::record_request(method.as_str(), 500, &worker_label, start_time);
            response::forward_failure()
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                worker = worker.index,
                port = worker.port,
                timeout = ?state.response_timeout,
                "Worker did not respond in time"
            );
            metrics::record_request(method.as_str(), 500, &worker_label, start_time);
            response::forward_failure()
        }
    }
}

/// Hand a worker response back to the client, streaming its body.
fn into_downstream(upstream: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = upstream.into_parts();
    headers::strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
