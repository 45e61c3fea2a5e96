//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ClusterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Base external port.
pub const ENV_PORT: &str = "PORT";
/// Worker count override.
pub const ENV_PARALLELISM: &str = "PARALLELISM";
/// Per-worker listening port, set by the supervisor on each child.
pub const ENV_WORKER_PORT: &str = "WORKER_PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then process
/// environment overrides. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<ClusterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            parse_config(&content)?
        }
        None => ClusterConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document. Missing sections fall back to defaults.
pub fn parse_config(content: &str) -> Result<ClusterConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply `PORT` and `PARALLELISM` from the given lookup.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut ClusterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = non_empty(lookup(ENV_PORT)) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: ENV_PORT,
            value: value.clone(),
        })?;
    }

    if let Some(value) = non_empty(lookup(ENV_PARALLELISM)) {
        let parallelism = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: ENV_PARALLELISM,
            value: value.clone(),
        })?;
        config.pool.parallelism = Some(parallelism);
    }

    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ClusterConfig::default());
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.timeouts.shutdown_grace_secs, 3);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [listener]
            port = 4000

            [pool]
            parallelism = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.pool.parallelism, Some(3));
        assert_eq!(config.pool.upstream_host, "localhost");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = parse_config("[listener]\nport = 4000\n").unwrap();
        apply_env_overrides(&mut config, env(&[("PORT", "5000"), ("PARALLELISM", "4")])).unwrap();

        assert_eq!(config.listener.port, 5000);
        assert_eq!(config.pool.parallelism, Some(4));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = ClusterConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", " "), ("PARALLELISM", "")])).unwrap();

        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.pool.parallelism, None);
    }

    #[test]
    fn malformed_env_values_are_rejected() {
        let mut config = ClusterConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));

        let err = apply_env_overrides(&mut config, env(&[("PARALLELISM", "-2")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PARALLELISM", .. }));
    }

    #[test]
    fn zero_parallelism_env_loads() {
        let mut config = ClusterConfig::default();
        apply_env_overrides(&mut config, env(&[("PARALLELISM", "0")])).unwrap();

        assert_eq!(config.pool.parallelism, Some(0));
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nshutdown_grace_secs = 7").unwrap();

        let config = parse_config(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(config.timeouts.shutdown_grace_secs, 7);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/crud-cluster.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
