//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (dotenvy, loaded in main)
//!     → optional TOML file → loader.rs (parse & deserialize)
//!     → PORT / PARALLELISM environment overrides
//!     → validation.rs (semantic checks)
//!     → ClusterConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once per process; worker children load their own copy
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClusterConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PoolConfig;
pub use schema::TimeoutConfig;
