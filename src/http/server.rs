//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router with every diagnostic route
//! - Wire up middleware (tracing, request ID, timeout, metrics)
//! - Serve on a bound listener with peer addresses attached
//! - Stop accepting on shutdown and drain within the grace period

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinError;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::Cache;
use crate::config::ServerConfig;
use crate::http::handlers;
use crate::lifecycle::{shutdown, Lifecycle, LifecycleState};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache collaborator; `None` leaves the lookup route unregistered.
    pub cache: Option<Arc<dyn Cache>>,
    /// Largest request body handlers will buffer.
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig, cache: Option<Arc<dyn Cache>>) -> Self {
        Self {
            cache,
            max_body_size: config.listener.max_body_size,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
}

/// HTTP server for the diagnostic endpoints.
pub struct HttpServer {
    router: Router,
    grace: Duration,
    lifecycle: Lifecycle,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
            grace: Duration::from_secs(config.timeouts.shutdown_grace_secs),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::greet))
            .route("/info", get(handlers::info))
            .route("/agent", get(handlers::user_agent))
            .route("/headers", get(handlers::headers))
            .route("/ip", get(handlers::client_ip))
            .route("/echo", get(handlers::echo_query).post(handlers::echo_body));

        if let Some(cache) = state.cache.clone() {
            router = router.route("/redis", get(handlers::cache_lookup).with_state(cache));
        }

        router
            .route_layer(middleware::from_fn(metrics::track_requests))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Handle for observing the server's lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Serve on `listener` until `shutdown_rx` fires, then drain.
    ///
    /// New connections stop being accepted as soon as the signal arrives.
    /// In-flight requests get the configured grace period; anything still
    /// running after it is abandoned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let Self {
            router,
            grace,
            lifecycle,
        } = self;

        let app = router.into_make_service_with_connect_info::<SocketAddr>();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut serving = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });

        lifecycle.advance(LifecycleState::Listening);
        tracing::info!(address = %addr, "HTTP server listening");

        tokio::select! {
            result = &mut serving => {
                lifecycle.advance(LifecycleState::Terminated);
                tracing::error!("HTTP server exited before shutdown was requested");
                return Ok(result??);
            }
            _ = shutdown_rx.recv() => {}
        }

        lifecycle.advance(LifecycleState::ShuttingDown);
        tracing::info!(
            grace_secs = grace.as_secs(),
            "Stopped accepting connections, draining in-flight requests"
        );
        let _ = stop_tx.send(());

        let outcome = shutdown::drain(&mut serving, grace).await;
        lifecycle.advance(LifecycleState::Terminated);
        match outcome {
            Some(result) => {
                result??;
                tracing::info!("HTTP server stopped");
            }
            None => tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, abandoning in-flight requests"
            ),
        }
        Ok(())
    }
}
