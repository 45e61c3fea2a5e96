//! In-process workers.
//!
//! Each worker is a Tokio task with its own listener, store and shutdown
//! signal. Used by tests and by embedders that cannot spawn processes.

use std::io;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::config::ClusterConfig;
use crate::http::WorkerServer;
use crate::lifecycle::{Shutdown, ShutdownOutcome};
use crate::net::{self, ListenerError};
use crate::supervisor::handle::{SpawnError, WorkerExit, WorkerHandle, WorkerLauncher};

/// Launches workers as tasks on the current runtime.
#[derive(Debug, Clone)]
pub struct TaskLauncher {
    config: ClusterConfig,
}

impl TaskLauncher {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }
}

impl WorkerLauncher for TaskLauncher {
    fn launch(&self, index: usize, port: u16) -> Result<Box<dyn WorkerHandle>, SpawnError> {
        let listener = net::bind_now(&self.config.listener.host, port)
            .map_err(|e| SpawnError::new(index, port, e))?;

        let server = WorkerServer::new(&self.config);
        let shutdown = Shutdown::new();
        let task_shutdown = shutdown.clone();
        let task = tokio::spawn(async move { server.run(listener, &task_shutdown).await });

        tracing::info!(index, port, "Worker task started");
        Ok(Box::new(TaskWorker {
            shutdown,
            task,
            exit: None,
        }))
    }
}

/// A worker running as a task.
#[derive(Debug)]
pub struct TaskWorker {
    shutdown: Shutdown,
    task: JoinHandle<Result<ShutdownOutcome, ListenerError>>,
    exit: Option<WorkerExit>,
}

#[async_trait]
impl WorkerHandle for TaskWorker {
    fn pid(&self) -> Option<u32> {
        None
    }

    fn stop(&mut self) -> io::Result<()> {
        self.shutdown.trigger();
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        self.exit.is_none() && !self.task.is_finished()
    }

    async fn join(&mut self) -> io::Result<WorkerExit> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }

        let exit = match (&mut self.task).await {
            Ok(Ok(ShutdownOutcome::Graceful)) => WorkerExit::Clean,
            Ok(Ok(ShutdownOutcome::Forced)) => WorkerExit::Code(1),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Worker task failed");
                WorkerExit::Code(1)
            }
            Err(e) if e.is_cancelled() => WorkerExit::Killed,
            Err(e) => return Err(io::Error::other(e)),
        };

        self.exit = Some(exit);
        Ok(exit)
    }

    async fn kill(&mut self) -> io::Result<WorkerExit> {
        self.task.abort();
        self.join().await
    }
}

impl Drop for TaskWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> TaskLauncher {
        let mut config = ClusterConfig::default();
        config.listener.host = "127.0.0.1".to_string();
        TaskLauncher::new(config)
    }

    #[tokio::test]
    async fn stop_then_join_is_clean() {
        let mut worker = launcher().launch(0, 0).unwrap();
        assert!(worker.is_alive());
        assert_eq!(worker.pid(), None);

        worker.stop().unwrap();
        assert_eq!(worker.join().await.unwrap(), WorkerExit::Clean);
        assert!(!worker.is_alive());

        // Joining again returns the recorded exit.
        assert_eq!(worker.join().await.unwrap(), WorkerExit::Clean);
    }

    #[tokio::test]
    async fn kill_aborts_task() {
        let mut worker = launcher().launch(0, 0).unwrap();
        assert_eq!(worker.kill().await.unwrap(), WorkerExit::Killed);
        assert!(!worker.is_alive());
    }

    #[tokio::test]
    async fn occupied_port_is_spawn_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = launcher().launch(3, port).unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(err.port, port);
    }
}
