//! Worker pool supervision.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     resolve_parallelism → Supervisor::spawn(count, base_port)
//!         → launcher.launch(i, base_port + i + 1)   (process.rs or task.rs)
//!         → WorkerDescriptor { index, port, handle }
//!     endpoints() → gateway WorkerPool
//!
//! Shutdown:
//!     terminate() → stop() every worker
//!         → join within the grace period
//!         → kill() stragglers
//! ```
//!
//! # Design Decisions
//! - No partial pools: a failed launch kills the workers already started
//! - No restart on crash; a dead worker is only noticed at termination
//! - The supervisor is not on the request path

pub mod handle;
pub mod process;
pub mod task;

use std::time::{Duration, Instant};

pub use handle::{SpawnError, WorkerExit, WorkerHandle, WorkerLauncher};
pub use process::ProcessLauncher;
pub use task::TaskLauncher;

use crate::load_balancer::{PoolError, WorkerEndpoint};

/// Worker count for the host.
///
/// An override that fits within `available` yields `override - 1`;
/// otherwise every available unit is used. Never less than one.
pub fn resolve_parallelism(requested: Option<usize>, available: usize) -> usize {
    let count = match requested {
        Some(n) if n <= available => n.saturating_sub(1),
        _ => available,
    };
    count.max(1)
}

/// Execution units on this host.
pub fn available_parallelism() -> usize {
    num_cpus::get()
}

/// Error type for supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

/// A spawned worker, owned by the supervisor.
#[derive(Debug)]
pub struct WorkerDescriptor {
    pub index: usize,
    pub port: u16,
    handle: Box<dyn WorkerHandle>,
}

impl WorkerDescriptor {
    pub fn endpoint(&self) -> WorkerEndpoint {
        WorkerEndpoint::new(self.index, self.port)
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.pid()
    }

    pub fn is_alive(&mut self) -> bool {
        self.handle.is_alive()
    }
}

/// Summary of a `terminate` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TerminationReport {
    /// Workers that drained and exited cleanly.
    pub graceful: usize,
    /// Workers killed after the grace period.
    pub forced: usize,
    /// Workers that exited with an error or could not be joined.
    pub failed: usize,
}

/// Owns the worker pool's lifecycle.
#[derive(Debug)]
pub struct Supervisor {
    workers: Vec<WorkerDescriptor>,
    grace: Duration,
}

impl Supervisor {
    /// Launch `count` workers on ports `base_port + 1 ..= base_port + count`.
    pub async fn spawn(
        launcher: &dyn WorkerLauncher,
        count: usize,
        base_port: u16,
        grace: Duration,
    ) -> Result<Self, SupervisorError> {
        if count == 0 {
            return Err(PoolError::Empty.into());
        }

        let ports = (0..count)
            .map(|index| {
                WorkerEndpoint::port_for(base_port, index)
                    .ok_or(PoolError::PortOutOfRange { base_port, index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut supervisor = Self {
            workers: Vec::with_capacity(count),
            grace,
        };

        for (index, port) in ports.into_iter().enumerate() {
            match launcher.launch(index, port) {
                Ok(handle) => supervisor.workers.push(WorkerDescriptor { index, port, handle }),
                Err(e) => {
                    tracing::error!(index, port, error = %e, "Worker spawn failed, tearing down pool");
                    supervisor.kill_all().await;
                    return Err(e.into());
                }
            }
        }

        Ok(supervisor)
    }

    /// Endpoints for the gateway, in dispatch order.
    pub fn endpoints(&self) -> Vec<WorkerEndpoint> {
        self.workers.iter().map(WorkerDescriptor::endpoint).collect()
    }

    pub fn workers(&self) -> &[WorkerDescriptor] {
        &self.workers
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Number of workers still running.
    pub fn alive_count(&mut self) -> usize {
        self.workers.iter_mut().map(|w| w.is_alive()).filter(|alive| *alive).count()
    }

    /// Stop every worker, wait up to the grace period, kill the rest.
    ///
    /// Calling again after termination is a no-op.
    pub async fn terminate(&mut self) -> TerminationReport {
        let mut report = TerminationReport::default();
        if self.workers.is_empty() {
            return report;
        }

        for worker in &mut self.workers {
            if let Err(e) = worker.handle.stop() {
                tracing::warn!(index = worker.index, error = %e, "Failed to signal worker");
            }
        }

        let deadline = Instant::now() + self.grace;
        for mut worker in self.workers.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, worker.handle.join()).await {
                Ok(Ok(exit)) => {
                    tracing::info!(index = worker.index, port = worker.port, exit = ?exit, "Worker exited");
                    if exit.success() {
                        report.graceful += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(index = worker.index, error = %e, "Failed to wait for worker");
                    report.failed += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        index = worker.index,
                        port = worker.port,
                        "Worker did not stop within grace period, killing"
                    );
                    if let Err(e) = worker.handle.kill().await {
                        tracing::error!(index = worker.index, error = %e, "Failed to kill worker");
                    }
                    report.forced += 1;
                }
            }
        }

        report
    }

    async fn kill_all(&mut self) {
        for mut worker in self.workers.drain(..) {
            if let Err(e) = worker.handle.kill().await {
                tracing::warn!(index = worker.index, error = %e, "Failed to kill worker");
            }
        }
    }
}
