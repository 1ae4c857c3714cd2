//! Diagnostic HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ net ──▶ http server ──▶ handlers            │
//!                             │   listener   (axum +        │      │         │
//!                             │              tower-http)    │      ▼         │
//!     Client Response         │                             │   agent,       │
//!     ◀───────────────────────┼──────────────────────────────   client_ip    │
//!                             │                             │                │
//!                             │                             ▼                │
//!                             │                           cache ─────────────┼──▶ Redis
//!                             │                                              │
//!                             │  config · observability · lifecycle          │
//!                             └──────────────────────────────────────────────┘
//! ```

use hello_server::config;
use hello_server::lifecycle::{signals, startup, Shutdown};
use hello_server::observability::logging;

#[tokio::main]
async fn main() {
    // Logging is not up yet, so these two report on stderr.
    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hello-server: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init(&config) {
        eprintln!("hello-server: {}", e);
        std::process::exit(1);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hello-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_file = config.logging.file.as_deref().unwrap_or("stdout"),
        cache = config.cache.address.as_deref().unwrap_or("disabled"),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let (server, listener) = match startup::prepare(&config).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::new();
    let shutdown_rx = signals::listen(&shutdown);

    if let Err(e) = server.run(listener, shutdown_rx).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}
