//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Connect cache → Seed → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain (bounded by grace period) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! State (state.rs):
//!     Starting → Listening → ShuttingDown → Terminated
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried
//! - Listener binds last so traffic only arrives once the cache is ready
//! - Shutdown has a deadline: in-flight work past it is abandoned

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::Shutdown;
pub use state::{Lifecycle, LifecycleState};
