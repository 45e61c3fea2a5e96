use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crud_cluster::config::load_config;
use crud_cluster::lifecycle::{
    run_cluster, run_standalone, run_worker, spawn_signal_listener, Shutdown, ShutdownOutcome,
};
use crud_cluster::observability::logging::init_logging;
use crud_cluster::supervisor::ProcessLauncher;

#[derive(Parser)]
#[command(name = "crud-cluster")]
#[command(about = "Users CRUD API behind a multi-process round-robin gateway", long_about = None)]
#[command(version)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true, env = "CLUSTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Spawn one worker per CPU and balance across them (default)
    Cluster,
    /// Serve the API on the base port from a single process
    Standalone,
    /// Serve the API on a worker port (started by the cluster supervisor)
    Worker {
        #[arg(long, env = "WORKER_PORT")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone())?;

    let outcome = match cli.mode.unwrap_or(Mode::Cluster) {
        Mode::Cluster => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "crud-cluster starting");

            let mut launcher = ProcessLauncher::current_exe()?;
            if let Some(path) = &cli.config {
                launcher = launcher.arg("--config").arg(path);
            }
            run_cluster(&config, &launcher, shutdown).await?
        }
        Mode::Standalone => run_standalone(&config, shutdown).await?,
        Mode::Worker { port } => run_worker(&config, port, shutdown).await?,
    };

    if outcome == ShutdownOutcome::Forced {
        tracing::warn!("Shutdown forced after grace period");
        std::process::exit(outcome.exit_code());
    }

    tracing::info!(pid = std::process::id(), "Shutdown complete");
    Ok(())
}
