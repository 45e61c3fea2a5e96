//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the cluster.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the cluster.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// External listener (gateway in cluster mode, API in standalone mode).
    pub listener: ListenerConfig,

    /// Worker pool settings.
    pub pool: PoolConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Base port. The gateway binds it; worker `i` binds `port + i + 1`.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ListenerConfig {
    /// Socket address string for the given port on the configured host.
    pub fn address_for(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Requested parallelism. `None` uses every available CPU.
    pub parallelism: Option<usize>,

    /// Host the gateway dials to reach workers.
    pub upstream_host: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            upstream_host: "localhost".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Grace period for draining in-flight requests on shutdown, in seconds.
    pub shutdown_grace_secs: u64,

    /// Worker connection establishment timeout in seconds.
    pub upstream_connect_secs: u64,

    /// Time allowed for a worker to send response headers, in seconds.
    pub upstream_response_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 3,
            upstream_connect_secs: 5,
            upstream_response_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn upstream_connect(&self) -> Duration {
        Duration::from_secs(self.upstream_connect_secs)
    }

    pub fn upstream_response(&self) -> Duration {
        Duration::from_secs(self.upstream_response_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus endpoint in the primary process.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "crud_cluster=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size accepted by workers, in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}
