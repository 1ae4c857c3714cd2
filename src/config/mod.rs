//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (read & parse variables)
//!     → validation.rs (range checks)
//!     → ServerConfig (validated, immutable)
//!     → passed by value to startup, then to each subsystem
//! ```
//!
//! # Design Decisions
//! - Environment is the only source; nothing is hardcoded beyond defaults
//! - All fields have defaults so an empty environment is a valid config
//! - Any configuration error is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from, load_from_env, ConfigError};
pub use schema::{
    CacheConfig, ListenerConfig, LoggingConfig, ObservabilityConfig, ServerConfig, TimeoutConfig,
};
