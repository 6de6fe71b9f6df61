//! Redis cache implementation.
//!
//! The connection manager is created on first use rather than at startup, so
//! the service comes up even when Redis does not. Every command runs under a
//! response deadline. After a connection-level failure or a missed deadline
//! the cache reports itself not ready for a cooldown window; the next command
//! after the window retries.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::FastCache;
use crate::error::{CacheError, CacheResult};

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const COMMAND_TIMEOUT: Duration = Duration::from_millis(500);

/// Redis-backed fast cache.
pub struct RedisCache {
    client: redis::Client,
    conn: RwLock<Option<ConnectionManager>>,
    /// Held only while a connection attempt is in flight
    connecting: Mutex<()>,
    /// Reference point for `failed_at_ms`
    epoch: Instant,
    /// Milliseconds since `epoch` (plus one) of the last connection failure, 0 if none
    failed_at_ms: AtomicU64,
    cooldown: Duration,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl RedisCache {
    /// Creates a cache for `url` (e.g. "redis://localhost:6379").
    ///
    /// Only the URL is validated here; no connection is made.
    pub fn new(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        Ok(Self {
            client,
            conn: RwLock::new(None),
            connecting: Mutex::new(()),
            epoch: Instant::now(),
            failed_at_ms: AtomicU64::new(0),
            cooldown: DEFAULT_COOLDOWN,
            connect_timeout: CONNECT_TIMEOUT,
            command_timeout: COMMAND_TIMEOUT,
        })
    }

    /// Overrides how long the cache stays not-ready after a connection failure.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Overrides the connect and per-command deadlines.
    pub fn with_timeouts(mut self, connect: Duration, command: Duration) -> Self {
        self.connect_timeout = connect;
        self.command_timeout = command;
        self
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX - 1) + 1
    }

    async fn current(&self) -> Option<ConnectionManager> {
        self.conn.read().await.clone()
    }

    /// Returns the shared connection, connecting if there is none yet.
    ///
    /// Callers arriving while another task is connecting get `Unavailable`
    /// instead of queueing behind the attempt.
    async fn connection(&self) -> CacheResult<ConnectionManager> {
        if let Some(conn) = self.current().await {
            return Ok(conn);
        }

        let Ok(_connecting) = self.connecting.try_lock() else {
            debug!("Redis connection attempt in progress, skipping cache");
            return Err(CacheError::Unavailable);
        };
        if let Some(conn) = self.current().await {
            return Ok(conn);
        }

        let conn = match tokio::time::timeout(
            self.connect_timeout,
            ConnectionManager::new(self.client.clone()),
        )
        .await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(err)) => return Err(self.record(err)),
            Err(_) => {
                self.mark_failed();
                return Err(CacheError::ConnectionFailed(
                    "timed out connecting to Redis".to_string(),
                ));
            }
        };

        info!("Connected to Redis");
        *self.conn.write().await = Some(conn.clone());
        Ok(conn)
    }

    /// Runs one command under the response deadline.
    ///
    /// A missed deadline drops the shared connection so the next attempt
    /// after the cooldown reconnects.
    async fn run<T, F>(&self, command: F) -> CacheResult<T>
    where
        T: Send,
        F: Future<Output = redis::RedisResult<T>> + Send,
    {
        match tokio::time::timeout(self.command_timeout, command).await {
            Ok(result) => self.settle(result),
            Err(_) => {
                warn!(
                    "Redis did not answer within {:?}, pausing cache use",
                    self.command_timeout
                );
                self.mark_failed();
                *self.conn.write().await = None;
                Err(CacheError::ConnectionFailed(
                    "timed out waiting for Redis".to_string(),
                ))
            }
        }
    }

    fn mark_failed(&self) {
        self.failed_at_ms.store(self.now_ms(), Ordering::SeqCst);
    }

    fn mark_healthy(&self) {
        self.failed_at_ms.store(0, Ordering::SeqCst);
    }

    /// Maps a Redis error, starting the cooldown when the connection itself failed.
    fn record(&self, err: redis::RedisError) -> CacheError {
        let mapped = map_redis_error(err);
        if let CacheError::ConnectionFailed(reason) = &mapped {
            warn!("Redis connection failed, pausing cache use: {}", reason);
            self.mark_failed();
        }
        mapped
    }

    fn settle<T>(&self, result: redis::RedisResult<T>) -> CacheResult<T> {
        match result {
            Ok(value) => {
                self.mark_healthy();
                Ok(value)
            }
            Err(err) => Err(self.record(err)),
        }
    }
}

#[async_trait]
impl FastCache for RedisCache {
    fn is_ready(&self) -> bool {
        let failed_at = self.failed_at_ms.load(Ordering::SeqCst);
        failed_at == 0
            || self.now_ms().saturating_sub(failed_at)
                >= u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        self.run(conn.get::<_, Option<String>>(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        // SET EX rejects zero
        let seconds = ttl.as_secs().max(1);
        self.run(conn.set_ex::<_, _, ()>(key, value, seconds)).await
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        self.run(conn.del::<_, ()>(key)).await
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let pong: String = self.run(redis::cmd("PING").query_async(&mut conn)).await?;
        debug!("Redis answered {}", pong);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Maps Redis errors to CacheError.
fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_io_error()
    {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}
