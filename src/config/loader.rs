//! Configuration loading from the environment.

use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Parse {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from the process environment.
pub fn load_from_env() -> Result<ServerConfig, ConfigError> {
    load_from(|var| std::env::var(var).ok())
}

/// Load and validate configuration using `lookup` to resolve variables.
///
/// Empty values are treated the same as unset ones.
pub fn load_from<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
    let mut config = ServerConfig::default();

    config.logging.file = get("LOG_FILE_LOCATION");
    if let Some(v) = parsed(&get, "LOG_MAX_SIZE_MB")? {
        config.logging.max_size_mb = v;
    }
    if let Some(v) = parsed(&get, "LOG_MAX_BACKUPS")? {
        config.logging.max_backups = v;
    }
    if let Some(v) = parsed(&get, "LOG_MAX_AGE_DAYS")? {
        config.logging.max_age_days = v;
    }
    if let Some(v) = parsed(&get, "LOG_COMPRESS")? {
        config.logging.compress = v;
    }

    config.cache.address = get("REDIS_ADDR");
    config.cache.password = get("REDIS_PASSWORD");
    if let Some(v) = parsed(&get, "REDIS_DB")? {
        config.cache.db = v;
    }
    if let Some(v) = parsed(&get, "CACHE_TIMEOUT_SECS")? {
        config.cache.op_timeout_secs = v;
    }
    if let Some(v) = parsed(&get, "SEED_CACHE")? {
        config.cache.seed = v;
    }

    config.observability.metrics_address = get("METRICS_ADDR");

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parsed<T, F>(get: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Parse {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}
