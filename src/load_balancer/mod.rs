//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway receives request
//!     → pool.rs (select_worker)
//!     → round_robin.rs (advance shared cursor)
//!     → backend.rs (worker endpoint: index + port)
//!     → Gateway dials the worker
//! ```
//!
//! # Design Decisions
//! - One strategy only: uniform round-robin
//! - Selection is positional; worker health and load are not consulted
//! - The pool is fixed after spawn; the cursor is its only mutable state

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::WorkerEndpoint;
pub use pool::{PoolError, WorkerPool};
pub use round_robin::RoundRobin;
