//! Configuration validation.
//!
//! Parsing in `loader.rs` only checks that values are well-formed; the checks
//! here cover ranges. All problems are collected rather than stopping at the
//! first one.

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check value ranges across the whole configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cache.db < 0 {
        errors.push(ValidationError::new("REDIS_DB", "must not be negative"));
    }
    if let Some(address) = &config.cache.address {
        if address.trim().is_empty() {
            errors.push(ValidationError::new("REDIS_ADDR", "must not be blank"));
        }
    }
    if config.cache.op_timeout_secs == 0 {
        errors.push(ValidationError::new("CACHE_TIMEOUT_SECS", "must be greater than zero"));
    }
    if config.logging.file.is_some() && config.logging.max_size_mb == 0 {
        errors.push(ValidationError::new("LOG_MAX_SIZE_MB", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
