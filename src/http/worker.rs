//! Worker runtime HTTP server.
//!
//! One listener, one in-memory store, the users API behind permissive CORS.
//! Used both under the supervisor and in standalone mode.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::api::{setup_api_router, UserStore};
use crate::config::ClusterConfig;
use crate::http::request;
use crate::lifecycle::{Shutdown, ShutdownOutcome};
use crate::net::{self, ListenerError};

/// HTTP server for a single worker.
pub struct WorkerServer {
    router: Router,
    store: Arc<UserStore>,
    grace: Duration,
}

impl WorkerServer {
    /// Worker with an empty store.
    pub fn new(config: &ClusterConfig) -> Self {
        Self::with_store(config, Arc::new(UserStore::new()))
    }

    pub fn with_store(config: &ClusterConfig, store: Arc<UserStore>) -> Self {
        let router = build_worker_router(
            setup_api_router(store.clone()),
            config.security.max_body_size,
        );

        Self {
            router,
            store,
            grace: config.timeouts.shutdown_grace(),
        }
    }

    pub fn store(&self) -> Arc<UserStore> {
        self.store.clone()
    }

    /// Serve until `shutdown` fires, then drain within the grace period.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: &Shutdown,
    ) -> Result<ShutdownOutcome, ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Serve)?;
        tracing::info!(address = %addr, pid = std::process::id(), "Worker listening");

        let outcome = net::serve_with_grace(listener, self.router, shutdown, self.grace).await?;

        tracing::info!(pid = std::process::id(), outcome = ?outcome, "Worker stopped");
        Ok(outcome)
    }
}

/// Apply the worker middleware stack to an API router.
pub fn build_worker_router(api: Router, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let router = api
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(cors);

    request::with_request_id(router).layer(TraceLayer::new_for_http())
}
