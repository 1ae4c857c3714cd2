//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.rs  → bind the fixed address, hand the socket to axum::serve
//! client_ip.rs → headers + peer address → originating client IP
//! ```

pub mod client_ip;
pub mod listener;

pub use listener::ListenerError;
