//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway (primary process):
//!     → server.rs (proxy handler)
//!     → request.rs (request ID)
//!     → load_balancer (pick worker)
//!     → security::headers (strip hop-by-hop, X-Forwarded-For)
//!     → hyper client → worker
//!     → response.rs (500 on forwarding failure)
//!
//! Worker (child process or standalone):
//!     → worker.rs (CORS, body limit, request ID)
//!     → api (users handlers)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod worker;

pub use request::{request_id, with_request_id, X_REQUEST_ID};
pub use server::GatewayServer;
pub use worker::WorkerServer;
