//! Worker handle and launcher abstractions.

use std::fmt;
use std::io;
use std::process::ExitStatus;

use async_trait::async_trait;

/// How a worker ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Exited with status 0 after draining.
    Clean,
    /// Exited with a non-zero status (including a forced drain timeout).
    Code(i32),
    /// Terminated by a signal or aborted.
    Killed,
}

impl WorkerExit {
    pub fn success(self) -> bool {
        matches!(self, WorkerExit::Clean)
    }
}

impl From<ExitStatus> for WorkerExit {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            WorkerExit::Clean
        } else {
            status.code().map(WorkerExit::Code).unwrap_or(WorkerExit::Killed)
        }
    }
}

/// Owned handle to one running worker.
#[async_trait]
pub trait WorkerHandle: Send + fmt::Debug {
    /// OS process id, if the worker is a live process.
    fn pid(&self) -> Option<u32>;

    /// Ask the worker to drain and exit. Does not wait.
    fn stop(&mut self) -> io::Result<()>;

    /// Whether the worker is still running.
    fn is_alive(&mut self) -> bool;

    /// Wait for the worker to exit.
    async fn join(&mut self) -> io::Result<WorkerExit>;

    /// Terminate immediately and wait for the worker to be reaped.
    async fn kill(&mut self) -> io::Result<WorkerExit>;
}

/// Error raised when a worker cannot be started.
#[derive(Debug, thiserror::Error)]
#[error("failed to launch worker {index} on port {port}: {source}")]
pub struct SpawnError {
    pub index: usize,
    pub port: u16,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl SpawnError {
    pub fn new(
        index: usize,
        port: u16,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            index,
            port,
            source: source.into(),
        }
    }
}

/// Starts workers bound to assigned ports.
pub trait WorkerLauncher: Send + Sync {
    fn launch(&self, index: usize, port: u16) -> Result<Box<dyn WorkerHandle>, SpawnError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn exit_status_mapping() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(WorkerExit::from(ExitStatus::from_raw(0)), WorkerExit::Clean);
        // Raw wait status: exit code lives in the high byte.
        assert_eq!(WorkerExit::from(ExitStatus::from_raw(1 << 8)), WorkerExit::Code(1));
        // SIGKILL.
        assert_eq!(WorkerExit::from(ExitStatus::from_raw(9)), WorkerExit::Killed);
    }

    #[test]
    fn only_clean_is_success() {
        assert!(WorkerExit::Clean.success());
        assert!(!WorkerExit::Code(1).success());
        assert!(!WorkerExit::Killed.success());
    }
}
