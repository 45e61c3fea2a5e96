//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and collects every
//! problem instead of stopping at the first.

use crate::config::schema::ClusterConfig;
use crate::supervisor::{available_parallelism, resolve_parallelism};

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.port {0} leaves no room for worker ports")]
    NoWorkerPorts(u16),

    #[error("{workers} workers push worker ports past 65535 (base port {port})")]
    PortRangeExceeded { port: u16, workers: usize },

    #[error("pool.upstream_host must not be empty")]
    EmptyUpstreamHost,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration against this host, returning every error found.
pub fn validate_config(config: &ClusterConfig) -> Result<(), Vec<ValidationError>> {
    validate_for_host(config, available_parallelism())
}

/// Validate a configuration for a host with `available` execution units.
///
/// The port range is checked against the resolved worker count, not the raw
/// `pool.parallelism` override.
pub fn validate_for_host(
    config: &ClusterConfig,
    available: usize,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let port = config.listener.port;

    if port == u16::MAX {
        errors.push(ValidationError::NoWorkerPorts(port));
    } else {
        let workers = resolve_parallelism(config.pool.parallelism, available);
        if usize::from(port) + workers > usize::from(u16::MAX) {
            errors.push(ValidationError::PortRangeExceeded { port, workers });
        }
    }

    if config.pool.upstream_host.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("shutdown_grace_secs", timeouts.shutdown_grace_secs),
        ("upstream_connect_secs", timeouts.upstream_connect_secs),
        ("upstream_response_secs", timeouts.upstream_response_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ClusterConfig::default()), Ok(()));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ClusterConfig::default();
        config.pool.upstream_host = String::new();
        config.timeouts.shutdown_grace_secs = 0;
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyUpstreamHost,
                ValidationError::ZeroTimeout("shutdown_grace_secs"),
                ValidationError::ZeroBodyLimit,
            ]
        );
    }

    #[test]
    fn zero_parallelism_resolves_to_one_worker() {
        let mut config = ClusterConfig::default();
        config.pool.parallelism = Some(0);
        assert_eq!(validate_for_host(&config, 8), Ok(()));
    }

    #[test]
    fn port_range_uses_resolved_worker_count() {
        let mut config = ClusterConfig::default();
        config.listener.port = 65_530;

        // An override of 6 on 8 units gives 5 workers: 65531..=65535.
        config.pool.parallelism = Some(6);
        assert_eq!(validate_for_host(&config, 8), Ok(()));

        // 7 gives 6 workers, one too many.
        config.pool.parallelism = Some(7);
        assert_eq!(
            validate_for_host(&config, 8).unwrap_err(),
            vec![ValidationError::PortRangeExceeded { port: 65_530, workers: 6 }]
        );

        // An override above the host limit uses every unit.
        config.pool.parallelism = Some(16);
        assert_eq!(
            validate_for_host(&config, 8).unwrap_err(),
            vec![ValidationError::PortRangeExceeded { port: 65_530, workers: 8 }]
        );
    }

    #[test]
    fn last_port_leaves_no_worker_ports() {
        let mut config = ClusterConfig::default();
        config.listener.port = u16::MAX;
        assert_eq!(
            validate_for_host(&config, 4).unwrap_err(),
            vec![ValidationError::NoWorkerPorts(u16::MAX)]
        );
    }
}
