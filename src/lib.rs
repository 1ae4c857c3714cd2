//! Diagnostic HTTP server library.
//!
//! Answers introspection requests (client IP, user-agent classification,
//! header dump, echo, greeting) and looks values up in an optional Redis cache.

// Core subsystems
pub mod agent;
pub mod cache;
pub mod config;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
