//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when configured
//! - Connect to the cache and verify it answers a PING, then seed it
//! - Build the HTTP server and bind the listener last
//!
//! Any error here is fatal; nothing is retried.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cache::{self, Cache, CacheError, RedisCache};
use crate::config::{CacheConfig, ConfigError, ServerConfig};
use crate::http::{AppState, HttpServer};
use crate::net::{listener, ListenerError};
use crate::observability::logging::LogError;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("logging: {0}")]
    Logging(#[from] LogError),
    #[error("could not connect to cache: {0}")]
    Cache(#[from] CacheError),
    #[error("metrics exporter: {0}")]
    Metrics(String),
    #[error("listener: {0}")]
    Listener(#[from] ListenerError),
}

/// Bring up every subsystem and return a server ready to run on its listener.
pub async fn prepare(config: &ServerConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    if let Some(address) = &config.observability.metrics_address {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| StartupError::Metrics(format!("invalid address {address:?}: {e}")))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let cache = connect_cache(&config.cache).await?;
    let server = HttpServer::new(config, AppState::new(config, cache));
    let listener = listener::bind(&config.listener).await?;

    Ok((server, listener))
}

/// Connect to the configured cache, verify it and seed it if enabled.
///
/// Returns `Ok(None)` when no cache address is configured.
pub async fn connect_cache(config: &CacheConfig) -> Result<Option<Arc<dyn Cache>>, CacheError> {
    let Some(redis) = RedisCache::connect(config).await? else {
        tracing::warn!("REDIS_ADDR not set, cache lookup route disabled");
        return Ok(None);
    };

    let cache = ready_cache(Arc::new(redis), config.seed).await?;
    Ok(Some(cache))
}

/// Ping `cache` (fatal on failure), then optionally write the seed entries.
pub async fn ready_cache(
    cache: Arc<dyn Cache>,
    seed: bool,
) -> Result<Arc<dyn Cache>, CacheError> {
    cache.ping().await?;

    if seed {
        let written = cache::seed(cache.as_ref()).await;
        tracing::info!(written, "Cache seeded");
    }
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[tokio::test]
    async fn prepare_without_cache_binds_listener() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();

        let (server, listener) = prepare(&config).await.unwrap();
        assert!(listener.local_addr().is_ok());
        assert_eq!(
            server.lifecycle().current(),
            crate::lifecycle::LifecycleState::Starting
        );
    }

    #[tokio::test]
    async fn unreachable_cache_is_fatal() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.cache.address = Some("127.0.0.1:1".into());
        config.cache.connect_timeout_secs = 1;

        assert!(matches!(prepare(&config).await, Err(StartupError::Cache(_))));
    }

    struct SilentCache;

    #[async_trait::async_trait]
    impl Cache for SilentCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
            Ok(())
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Err(CacheError::UnexpectedReply("LOADING".into()))
        }
    }

    #[tokio::test]
    async fn failed_ping_is_fatal() {
        let result = ready_cache(Arc::new(SilentCache), true).await;
        assert!(matches!(result, Err(CacheError::UnexpectedReply(_))));
    }

    #[tokio::test]
    async fn answering_cache_is_seeded() {
        let cache = ready_cache(Arc::new(MemoryCache::new()), true).await.unwrap();
        assert_eq!(
            cache.get("user:1:name").await.unwrap().as_deref(),
            Some("Cetriolo")
        );

        let unseeded = ready_cache(Arc::new(MemoryCache::new()), false).await.unwrap();
        assert_eq!(unseeded.get("user:1:name").await.unwrap(), None);
    }

    #[tokio::test]
    async fn bad_metrics_address_is_fatal() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = Some("nowhere".into());

        assert!(matches!(prepare(&config).await, Err(StartupError::Metrics(_))));
    }
}
