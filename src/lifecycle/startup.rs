//! Startup orchestration.
//!
//! # Responsibilities
//! - Cluster mode: spawn the worker pool, then bind the gateway
//! - Worker and standalone modes: bind one API listener
//! - Drain gateway and workers together once shutdown fires
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, and tears down workers already started
//! - The gateway binds last, so traffic only arrives once the pool exists
//! - Metrics are installed by the primary only

use crate::config::ClusterConfig;
use crate::http::{GatewayServer, WorkerServer};
use crate::lifecycle::{Shutdown, ShutdownOutcome};
use crate::load_balancer::{PoolError, WorkerPool};
use crate::net::{self, ListenerError};
use crate::observability::metrics;
use crate::supervisor::{
    available_parallelism, resolve_parallelism, Supervisor, SupervisorError, WorkerLauncher,
};

/// Error type for startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Run the primary process: worker pool plus round-robin gateway.
///
/// Returns once `shutdown` has fired and both the gateway and the workers have
/// stopped. The outcome is `Forced` if anything had to be cut short.
pub async fn run_cluster(
    config: &ClusterConfig,
    launcher: &dyn WorkerLauncher,
    shutdown: Shutdown,
) -> Result<ShutdownOutcome, StartupError> {
    install_metrics(config);

    let base_port = config.listener.port;
    let count = resolve_parallelism(config.pool.parallelism, available_parallelism());
    tracing::info!(
        pid = std::process::id(),
        workers = count,
        base_port,
        "Primary process starting"
    );

    let grace = config.timeouts.shutdown_grace();
    let mut supervisor = Supervisor::spawn(launcher, count, base_port, grace).await?;

    let pool = match WorkerPool::new(supervisor.endpoints()) {
        Ok(pool) => pool,
        Err(e) => {
            supervisor.terminate().await;
            return Err(e.into());
        }
    };

    let listener = match net::bind(&config.listener.host, base_port).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                address = %config.listener.address_for(base_port),
                error = %e,
                "Gateway bind failed, stopping workers"
            );
            supervisor.terminate().await;
            return Err(e.into());
        }
    };

    let gateway = GatewayServer::new(config, pool);
    let mut signal = shutdown.subscribe();
    let gateway_run = gateway.run(listener, &shutdown);
    tokio::pin!(gateway_run);

    // The gateway only returns on its own if the accept loop fails.
    let early = tokio::select! {
        res = &mut gateway_run => Some(res),
        _ = signal.recv() => None,
    };

    let (gateway_result, report) = match early {
        Some(res) => {
            tracing::error!("Gateway stopped unexpectedly, stopping workers");
            shutdown.trigger();
            (res, supervisor.terminate().await)
        }
        None => tokio::join!(gateway_run, supervisor.terminate()),
    };

    tracing::info!(
        graceful = report.graceful,
        forced = report.forced,
        failed = report.failed,
        "Worker pool stopped"
    );

    let gateway_outcome = gateway_result?;
    if gateway_outcome == ShutdownOutcome::Forced || report.forced > 0 || report.failed > 0 {
        Ok(ShutdownOutcome::Forced)
    } else {
        Ok(ShutdownOutcome::Graceful)
    }
}

/// Run one worker on `port` until `shutdown` fires.
pub async fn run_worker(
    config: &ClusterConfig,
    port: u16,
    shutdown: Shutdown,
) -> Result<ShutdownOutcome, StartupError> {
    let listener = net::bind(&config.listener.host, port).await?;
    let outcome = WorkerServer::new(config).run(listener, &shutdown).await?;
    Ok(outcome)
}

/// Run the API directly on the base port, with no pool or gateway.
pub async fn run_standalone(
    config: &ClusterConfig,
    shutdown: Shutdown,
) -> Result<ShutdownOutcome, StartupError> {
    tracing::info!(port = config.listener.port, "Running in standalone mode");
    run_worker(config, config.listener.port, shutdown).await
}

fn install_metrics(config: &ClusterConfig) {
    if !config.observability.metrics_enabled {
        return;
    }

    match config.observability.metrics_address.parse() {
        Ok(addr) => {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to install metrics exporter");
            }
        }
        Err(_) => tracing::error!(
            metrics_address = %config.observability.metrics_address,
            "Failed to parse metrics address"
        ),
    }
}
