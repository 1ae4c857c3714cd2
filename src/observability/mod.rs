//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and startup produce:
//!     → logging.rs (structured log events, stdout or file)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Sinks:
//!     → stdout, or rotation.rs (size-rotated, gzipped backups)
//!     → Prometheus scrape endpoint when METRICS_ADDR is set
//! ```

pub mod logging;
pub mod metrics;
pub mod rotation;
