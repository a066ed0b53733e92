//! Redis cache client implementation
//!
//! Provides a Redis client with connection retry at startup and a bounded
//! response time for every command. Commands are never retried: a failed
//! write must surface to the caller rather than be replayed later.

use std::future::Future;
use std::time::Duration;

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisResult};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Redis cache client over a shared multiplexed connection
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Upper bound on a single command round trip
    response_timeout: Duration,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use ja_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379");
    ///     let client = RedisClient::new(&config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.connect_retries.max(1), 100).await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            response_timeout: config.response_timeout(),
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value that expires after `ttl`
    ///
    /// The expiry is written in milliseconds, rounded up, so the key never
    /// outlives its intended lifetime by less than the TTL.
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), InfrastructureError> {
        let millis = expiry_millis(ttl);

        self.execute("set", |mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            async move {
                redis::cmd("PSETEX")
                    .arg(key)
                    .arg(millis)
                    .arg(value)
                    .query_async::<_, ()>(&mut conn)
                    .await
            }
        })
        .await
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        self.execute("exists", |mut conn| {
            let key = key.to_string();
            async move { conn.exists::<_, bool>(key).await }
        })
        .await
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Ok(true)` - The key existed and was removed by this call
    /// * `Ok(false)` - The key was not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let deleted: u32 = self
            .execute("del", |mut conn| {
                let key = key.to_string();
                async move { conn.del::<_, u32>(key).await }
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Delete several keys in one command and return how many existed
    pub async fn delete_many(&self, keys: Vec<String>) -> Result<usize, InfrastructureError> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.execute("del", move |mut conn| async move {
            conn.del::<_, usize>(keys).await
        })
        .await
    }

    /// Collect every key matching a glob pattern using cursor-based SCAN
    ///
    /// Each SCAN round trip is bounded by the response timeout.
    pub async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, InfrastructureError> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch) = self
                .execute("scan", |mut conn| {
                    let pattern = pattern.to_string();
                    async move {
                        redis::cmd("SCAN")
                            .cursor_arg(cursor)
                            .arg("MATCH")
                            .arg(pattern)
                            .arg("COUNT")
                            .arg(SCAN_BATCH)
                            .query_async::<_, (u64, Vec<String>)>(&mut conn)
                            .await
                    }
                })
                .await?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern, count = keys.len(), "SCAN complete");
        Ok(keys)
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response: String = self
            .execute("ping", |mut conn| async move {
                redis::cmd("PING").query_async::<_, String>(&mut conn).await
            })
            .await?;

        if response == "PONG" {
            debug!("Redis health check passed");
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Run one command against the shared connection under the response timeout
    async fn execute<F, Fut, T>(
        &self,
        command: &'static str,
        operation: F,
    ) -> Result<T, InfrastructureError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let conn = self.connection.clone();

        match timeout(self.response_timeout, operation(conn)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(command, error = %e, "Redis command failed");
                Err(InfrastructureError::Cache(e))
            }
            Err(_) => {
                error!(command, timeout = ?self.response_timeout, "Redis command timed out");
                Err(InfrastructureError::Timeout(self.response_timeout))
            }
        }
    }
}

/// TTL in whole milliseconds, rounded up and at least 1
pub(crate) fn expiry_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_millis() + u128::from(ttl.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(millis).unwrap_or(u64::MAX).max(1)
}

/// Mask sensitive parts of Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
