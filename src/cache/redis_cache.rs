//! Redis-backed cache.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ConnectionInfo, IntoConnectionInfo};

use super::{Cache, CacheError};
use crate::config::CacheConfig;
use crate::net::client_ip::split_host_port;

/// Cache client over a multiplexed, auto-reconnecting Redis connection.
///
/// `ConnectionManager` is cheap to clone, so each operation works on its own
/// handle and no locking is needed here.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCache {
    /// Open the managed connection within the connect deadline.
    ///
    /// Returns `Ok(None)` when no address is configured. Callers verify the
    /// server with [`Cache::ping`] before use.
    pub async fn connect(config: &CacheConfig) -> Result<Option<Self>, CacheError> {
        let Some(address) = config.address.as_deref() else {
            return Ok(None);
        };

        let info = connection_info(address, config)?;
        let client = Client::open(info)?;

        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        let conn = with_deadline(connect_timeout, client.get_connection_manager()).await?;

        tracing::info!(address = %address, db = config.db, "Connected to Redis");
        Ok(Some(Self {
            conn,
            op_timeout: Duration::from_secs(config.op_timeout_secs),
        }))
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        with_deadline(self.op_timeout, async move {
            let value: redis::RedisResult<Option<String>> = conn.get(key).await;
            value
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        with_deadline(self.op_timeout, async move {
            let reply: redis::RedisResult<()> = conn.set(key, value).await;
            reply
        })
        .await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let reply: String = with_deadline(self.op_timeout, async move {
            let reply: redis::RedisResult<String> =
                redis::cmd("PING").query_async(&mut conn).await;
            reply
        })
        .await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::UnexpectedReply(reply))
        }
    }
}

async fn with_deadline<T, E, F>(deadline: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = Result<T, E>>,
    CacheError: From<E>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(CacheError::from),
        Err(_) => Err(CacheError::Timeout(deadline)),
    }
}

/// Build connection info from `host:port` plus credentials and db index.
fn connection_info(address: &str, config: &CacheConfig) -> Result<ConnectionInfo, CacheError> {
    let (host, port) =
        split_host_port(address).ok_or_else(|| CacheError::Address(address.to_string()))?;
    let port: u16 = port
        .parse()
        .map_err(|_| CacheError::Address(address.to_string()))?;

    let mut info = (host.to_string(), port).into_connection_info()?;
    info.redis.db = config.db;
    info.redis.password = config.password.clone();
    Ok(info)
}
