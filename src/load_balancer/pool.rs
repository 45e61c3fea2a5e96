//! Worker pool state held by the gateway.
//!
//! # Responsibilities
//! - Hold the fixed, ordered list of worker endpoints
//! - Own the round-robin cursor and expose it only through `select_worker`

use crate::load_balancer::{backend::WorkerEndpoint, round_robin::RoundRobin};

/// Error type for pool construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool must contain at least one worker")]
    Empty,

    #[error("worker {index} port does not fit below 65536 (base port {base_port})")]
    PortOutOfRange { base_port: u16, index: usize },
}

/// Fixed-size pool of workers with a shared dispatch cursor.
#[derive(Debug)]
pub struct WorkerPool {
    endpoints: Vec<WorkerEndpoint>,
    balancer: RoundRobin,
}

impl WorkerPool {
    /// Build a pool from explicit endpoints, in dispatch order.
    pub fn new(endpoints: Vec<WorkerEndpoint>) -> Result<Self, PoolError> {
        if endpoints.is_empty() {
            return Err(PoolError::Empty);
        }
        let balancer = RoundRobin::new(endpoints.len());
        Ok(Self { endpoints, balancer })
    }

    /// Build a pool of `count` workers on `base_port + 1 ..= base_port + count`.
    pub fn from_base_port(base_port: u16, count: usize) -> Result<Self, PoolError> {
        let endpoints = (0..count)
            .map(|index| {
                WorkerEndpoint::port_for(base_port, index)
                    .map(|port| WorkerEndpoint::new(index, port))
                    .ok_or(PoolError::PortOutOfRange { base_port, index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(endpoints)
    }

    /// Select the next worker in round-robin order.
    pub fn select_worker(&self) -> WorkerEndpoint {
        self.endpoints[self.balancer.next_index()]
    }

    /// Index of the most recently selected worker.
    pub fn cursor(&self) -> usize {
        self.balancer.cursor()
    }

    pub fn endpoints(&self) -> &[WorkerEndpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
