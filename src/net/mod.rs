//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept via axum::serve, graceful drain)
//!     → connection.rs (in-flight request tracking)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Shutdown stops the accept loop first, then drains
//! - Draining is bounded; the caller decides how to exit on timeout

pub mod connection;
pub mod listener;

pub use connection::{InFlightGuard, InFlightTracker};
pub use listener::{bind, bind_now, serve_with_grace, ListenerError};
