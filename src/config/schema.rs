//! Configuration schema definitions.
//!
//! All settings come from the environment (see `loader.rs`). Every field has a
//! default so an empty environment yields a runnable server with no cache.

/// Root configuration for the server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Log sink configuration.
    pub logging: LoggingConfig,

    /// Cache collaborator settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Address the server listens on. Not configurable from the environment.
pub const BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body the echo handler will buffer.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: BIND_ADDRESS.to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log sink configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log file path. Logs go to stdout when unset.
    pub file: Option<String>,

    /// Rotate once the active file would exceed this many megabytes.
    pub max_size_mb: u64,

    /// Number of rotated files to keep (0 keeps all).
    pub max_backups: usize,

    /// Delete rotated files older than this many days (0 never deletes).
    pub max_age_days: u64,

    /// Gzip rotated files.
    pub compress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            max_size_mb: 500,
            max_backups: 3,
            max_age_days: 28,
            compress: true,
        }
    }
}

/// Cache collaborator configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// `host:port` of the Redis server. The cache lookup route is disabled when unset.
    pub address: Option<String>,

    /// Optional password.
    pub password: Option<String>,

    /// Database index.
    pub db: i64,

    /// Deadline for opening the connection, in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for a single cache round trip, including the startup ping, in seconds.
    pub op_timeout_secs: u64,

    /// Write the seed entries at startup.
    pub seed: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address: None,
            password: None,
            db: 0,
            connect_timeout_secs: 5,
            op_timeout_secs: 5,
            seed: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests after a shutdown signal, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 10,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "hello_server=info,tower_http=info".to_string(),
            metrics_address: None,
        }
    }
}
