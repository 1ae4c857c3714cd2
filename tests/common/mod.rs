//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use hello_server::cache::{Cache, CacheError};
use hello_server::http::ServerError;
use hello_server::lifecycle::{Lifecycle, LifecycleState};
use hello_server::{AppState, HttpServer, ServerConfig, Shutdown};

/// Peer address attached to requests sent through [`app`].
pub const PEER: ([u8; 4], u16) = ([5, 5, 5, 5], 1111);

/// Router with a fixed peer address, for `oneshot` tests.
pub fn app(config: &ServerConfig, cache: Option<Arc<dyn Cache>>) -> Router {
    HttpServer::build_router(config, AppState::new(config, cache))
        .layer(MockConnectInfo(SocketAddr::from(PEER)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A cache whose every operation fails.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Timeout(Duration::from_secs(5)))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Err(CacheError::Timeout(Duration::from_secs(5)))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Timeout(Duration::from_secs(5)))
    }
}

/// A live server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub lifecycle: Lifecycle,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server and wait until it reports `Listening`.
pub async fn start_server(config: ServerConfig, cache: Option<Arc<dyn Cache>>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config, AppState::new(&config, cache));
    let lifecycle = server.lifecycle();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_state(&lifecycle, LifecycleState::Listening).await;

    TestServer {
        addr,
        shutdown,
        lifecycle,
        handle,
    }
}

pub async fn wait_for_state(lifecycle: &Lifecycle, state: LifecycleState) {
    let mut rx = lifecycle.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == state))
        .await
        .expect("timed out waiting for lifecycle state")
        .expect("lifecycle channel closed");
}

/// HTTP client that never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
