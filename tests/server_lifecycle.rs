//! Live-socket tests for serving and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use hello_server::cache::{self, MemoryCache};
use hello_server::lifecycle::LifecycleState;
use hello_server::{AppState, HttpServer, ServerConfig, Shutdown};

mod common;

/// Poll until a connect to `addr` fails, for up to two seconds.
async fn refuses_connections(addr: SocketAddr) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if TcpStream::connect(addr).await.is_err() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn serves_requests_until_shutdown() {
    let server = common::start_server(ServerConfig::default(), None).await;
    let client = common::client();

    let res = client.get(server.url("/ip")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "127.0.0.1\n");

    let res = client.get(server.url("/?name=Test")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "Hello, Test\n");

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(server.lifecycle.current(), LifecycleState::Terminated);

    // Listener is gone once the server has stopped.
    assert!(TcpStream::connect(server.addr).await.is_err());
}

#[tokio::test]
async fn seeded_cache_is_served() {
    let memory = Arc::new(MemoryCache::new());
    cache::seed(memory.as_ref()).await;

    let server = common::start_server(ServerConfig::default(), Some(memory)).await;
    let client = common::client();

    let res = client
        .get(server.url("/redis?key=user:1:name"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Cetriolo\n");

    let res = client
        .get(server.url("/redis?key=user:2:name"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    server.shutdown.trigger();
}

#[tokio::test]
async fn in_flight_request_completes_during_drain() {
    let server = common::start_server(ServerConfig::default(), None).await;

    // Start a POST whose body is only half sent.
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nHost: test\r\nContent-Length: 10\r\nConnection: close\r\n\r\nhello")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger();
    common::wait_for_state(&server.lifecycle, LifecycleState::ShuttingDown).await;

    // New connections are refused while the in-flight request is still open.
    assert!(
        refuses_connections(server.addr).await,
        "listener still accepting during drain"
    );
    assert_eq!(server.lifecycle.current(), LifecycleState::ShuttingDown);

    // The request still finishes after the signal.
    stream.write_all(b"world").await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "got {response:?}");
    assert!(response.ends_with("helloworld"), "got {response:?}");

    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn stalled_request_is_abandoned_after_grace_period() {
    let mut config = ServerConfig::default();
    config.timeouts.shutdown_grace_secs = 1;
    let server = common::start_server(config, None).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nHost: test\r\nContent-Length: 100\r\n\r\npartial")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    server.shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("grace period was not enforced")
        .unwrap();
    assert!(result.is_ok());
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(server.lifecycle.current(), LifecycleState::Terminated);
}

#[tokio::test]
async fn shutdown_sent_before_run_still_stops_server() {
    let config = ServerConfig::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = HttpServer::new(&config, AppState::new(&config, None));
    let lifecycle = server.lifecycle();

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), server.run(listener, shutdown_rx))
        .await
        .expect("early shutdown signal was lost");
    assert!(result.is_ok());
    assert_eq!(lifecycle.current(), LifecycleState::Terminated);
}
