//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout/stderr (every process)
//!     → Prometheus scrape endpoint (primary process only)
//! ```
//!
//! # Design Decisions
//! - Worker children inherit stdout/stderr, so all logs land in one stream
//! - Every gateway log line names the worker that handled the request
//! - Metrics are opt-in; the exporter binds its own port

pub mod logging;
pub mod metrics;
