//! Worker endpoint abstraction.
//!
//! The gateway's view of a worker: where to reach it, nothing about its
//! process. Process handles stay with the supervisor.

use std::fmt;

/// A single worker the gateway can forward to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerEndpoint {
    /// Position in the pool, `0..N`.
    pub index: usize,
    /// Listening port, fixed at spawn time.
    pub port: u16,
}

impl WorkerEndpoint {
    pub fn new(index: usize, port: u16) -> Self {
        Self { index, port }
    }

    /// Port assigned to worker `index` for the given base port.
    ///
    /// Returns `None` when the port would not fit in a `u16`.
    pub fn port_for(base_port: u16, index: usize) -> Option<u16> {
        let port = usize::from(base_port).checked_add(index)?.checked_add(1)?;
        u16::try_from(port).ok()
    }

    /// Origin URL for the worker on the given host.
    pub fn origin(&self, host: &str) -> String {
        format!("http://{}:{}", host, self.port)
    }
}

impl fmt::Display for WorkerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}@{}", self.index, self.port)
    }
}
