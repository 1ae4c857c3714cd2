//! Key-value cache collaborator.
//!
//! # Data Flow
//! ```text
//! startup.rs
//!     → RedisCache::connect (fatal on failure)
//!     → Cache::ping (fatal on failure)
//!     → seed() (failures logged only)
//!     → Arc<dyn Cache> stored in AppState
//!
//! /redis handler
//!     → Cache::get(key) → Some(value) | None (miss) | CacheError
//! ```
//!
//! # Design Decisions
//! - One client built at startup and injected, no global handle
//! - Misses are `Ok(None)`, not an error variant
//! - Every round trip is bounded by a per-operation deadline

pub mod memory;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Entries written at startup so the lookup route has something to return.
pub const SEED_ENTRIES: &[(&str, &str)] =
    &[("app:name", "go-hello-server"), ("user:1:name", "Cetriolo")];

/// Errors surfaced by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache address {0:?}")]
    Address(String),

    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected reply to PING: {0:?}")]
    UnexpectedReply(String),
}

/// A key-value store shared by all request handlers.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch `key`. A missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` with no expiry.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Round-trip check used at startup.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Write [`SEED_ENTRIES`]. Returns how many were written; failures are logged.
pub async fn seed(cache: &dyn Cache) -> usize {
    tracing::info!(entries = SEED_ENTRIES.len(), "Seeding cache");

    let mut written = 0;
    for (key, value) in SEED_ENTRIES {
        match cache.set(key, value).await {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to seed cache entry"),
        }
    }
    written
}
