//! OS signal handling.
//!
//! SIGINT and SIGTERM (Ctrl+C elsewhere) both request a graceful shutdown.

use tokio::sync::broadcast;

use crate::lifecycle::Shutdown;

/// Wait for a termination signal and return its name.
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("ctrl-c")
    }
}

/// Trigger `shutdown` when a termination signal arrives.
pub fn spawn_signal_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_termination().await {
            Ok(signal) => {
                tracing::info!(signal, "Shutdown signal received");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
        }
    })
}

/// Subscribe to `shutdown`, then start the signal listener.
///
/// The receiver exists before the listener task does, so a signal arriving
/// during startup is never broadcast to zero subscribers.
pub fn listen(shutdown: &Shutdown) -> broadcast::Receiver<()> {
    let shutdown_rx = shutdown.subscribe();
    spawn_signal_listener(shutdown.clone());
    shutdown_rx
}
