//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config loaded → Spawn workers → Bind gateway → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain within grace → Exit 0, or exit 1 if forced
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     Second signal → Exit immediately
//! ```
//!
//! # Design Decisions
//! - Ordered startup: workers first, then the gateway
//! - Gateway and workers drain concurrently against the same grace period
//! - Shutdown has timeout: forced exit after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownOutcome, ShutdownSignal};
pub use signals::spawn_signal_listener;
pub use startup::{run_cluster, run_standalone, run_worker, StartupError};
