//! Structured logging.
//!
//! # Responsibilities
//! - Install the global tracing subscriber
//! - Route output to stdout, or to a rotating file when `LOG_FILE_LOCATION` is set
//! - Honour `RUST_LOG`, falling back to the configured default directive

use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ServerConfig;
use crate::observability::rotation::{RollingFile, RotationPolicy};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
    #[error("logging already initialised: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &ServerConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.observability.log_filter.as_str().into());

    match &config.logging.file {
        Some(path) => {
            let file = RollingFile::open(path, RotationPolicy::from(&config.logging)).map_err(
                |source| LogError::File {
                    path: path.clone(),
                    source,
                },
            )?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
    }
    Ok(())
}
