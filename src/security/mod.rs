//! Request hygiene at the gateway boundary.
//!
//! # Design Decisions
//! - No authentication; the cluster trusts its network
//! - Body size limits are enforced by workers, where bodies are parsed

pub mod headers;
