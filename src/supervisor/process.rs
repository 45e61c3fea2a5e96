//! Worker processes.
//!
//! Workers are started by re-executing the current binary in `worker` mode
//! with `WORKER_PORT` set, rather than forking.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::config::loader::ENV_WORKER_PORT;
use crate::supervisor::handle::{SpawnError, WorkerExit, WorkerHandle, WorkerLauncher};

/// Launches workers as child processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    /// Launcher for an explicit binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Launcher re-executing the running binary.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Extra argument placed before the `worker` subcommand.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl WorkerLauncher for ProcessLauncher {
    fn launch(&self, index: usize, port: u16) -> Result<Box<dyn WorkerHandle>, SpawnError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("worker")
            .env(ENV_WORKER_PORT, port.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Own process group: a terminal Ctrl+C reaches only the supervisor,
        // which then stops workers itself.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| SpawnError::new(index, port, e))?;

        tracing::info!(index, port, pid = ?child.id(), "Worker started");
        Ok(Box::new(ProcessWorker { child }))
    }
}

/// A worker running as a child process.
#[derive(Debug)]
pub struct ProcessWorker {
    child: Child,
}

#[async_trait]
impl WorkerHandle for ProcessWorker {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(unix)]
    fn stop(&mut self) -> io::Result<()> {
        let Some(pid) = self.child.id() else {
            // Already reaped.
            return Ok(());
        };

        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(io::Error::other(e)),
        }
    }

    #[cfg(not(unix))]
    fn stop(&mut self) -> io::Result<()> {
        // No graceful signal available; terminate.
        self.child.start_kill()
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    async fn join(&mut self) -> io::Result<WorkerExit> {
        self.child.wait().await.map(WorkerExit::from)
    }

    async fn kill(&mut self) -> io::Result<WorkerExit> {
        if let Some(status) = self.child.try_wait()? {
            return Ok(status.into());
        }
        self.child.kill().await?;
        self.join().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn sleep_process_stops_on_sigterm() {
        let child = Command::new("sleep").arg("30").spawn().expect("failed to spawn sleep");
        let mut worker = ProcessWorker { child };

        assert!(worker.is_alive());
        worker.stop().unwrap();

        let exit = tokio::time::timeout(Duration::from_secs(5), worker.join())
            .await
            .expect("sleep should exit on SIGTERM")
            .unwrap();
        assert_eq!(exit, WorkerExit::Killed);
        assert!(!worker.is_alive());
    }

    #[tokio::test]
    async fn kill_after_exit_returns_status() {
        let child = Command::new("true").spawn().expect("failed to spawn true");
        let mut worker = ProcessWorker { child };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(worker.kill().await.unwrap(), WorkerExit::Clean);
        // Stopping a reaped worker is a no-op.
        worker.stop().unwrap();
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();

        let launcher = ProcessLauncher::new("/nonexistent/crud-cluster");
        let err = launcher.launch(0, 3001).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.port, 3001);
    }
}
