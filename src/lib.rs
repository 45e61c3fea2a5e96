//! Clustered users CRUD service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               PRIMARY PROCESS                │
//!     Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!     ───────────────────┼─▶│   net   │──▶│  http    │──▶│ load_     │  │
//!                        │  │listener │   │ gateway  │   │ balancer  │  │
//!                        │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                        │                                     │        │
//!                        │  ┌────────────┐                     │        │
//!                        │  │ supervisor │ spawns/stops        │        │
//!                        │  └─────┬──────┘                     │        │
//!                        └────────┼────────────────────────────┼────────┘
//!                                 ▼                            ▼
//!                        ┌──────────────────────────────────────────────┐
//!                        │   WORKER i  (port = base + i + 1)            │
//!                        │   http::worker → api (users, in-memory)      │
//!                        └──────────────────────────────────────────────┘
//!
//!     Cross-cutting: config, lifecycle, observability, security
//! ```
//!
//! Each worker owns its own store. A user created through one worker is not
//! visible through another.

// Core subsystems
pub mod api;
pub mod config;
pub mod http;
pub mod net;

// Process management
pub mod load_balancer;
pub mod supervisor;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ClusterConfig;
pub use http::{GatewayServer, WorkerServer};
pub use lifecycle::Shutdown;
