//! Redis estimator backend.
//!
//! Each [`RedisConnection`] owns a multiplexed connection; commands clone the
//! handle so concurrent requests pipeline over a single socket. Timeouts are
//! enforced here rather than by the driver so a stalled server surfaces as a
//! failed ping and triggers the store's reconnect sequence.

use crate::error::{CounterError, CounterResult};
use crate::traits::{EstimatorConnection, EstimatorConnector};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Opens connections to a Redis-compatible server.
pub struct RedisConnector {
    client: Client,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl RedisConnector {
    /// Create a connector. The URL is parsed eagerly; no connection is made.
    pub fn new(
        url: &str,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> CounterResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            connect_timeout,
            response_timeout,
        })
    }
}

#[async_trait]
impl EstimatorConnector for RedisConnector {
    #[instrument(skip(self), fields(backend = "redis"))]
    async fn connect(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        let conn = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| CounterError::Timeout(self.connect_timeout))??;

        Ok(Arc::new(RedisConnection {
            conn,
            response_timeout: self.response_timeout,
        }))
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// A live Redis connection.
#[derive(Clone)]
pub struct RedisConnection {
    conn: MultiplexedConnection,
    response_timeout: Duration,
}

impl RedisConnection {
    async fn timed<T>(&self, command: impl Future<Output = RedisResult<T>>) -> CounterResult<T> {
        tokio::time::timeout(self.response_timeout, command)
            .await
            .map_err(|_| CounterError::Timeout(self.response_timeout))?
            .map_err(CounterError::from)
    }
}

#[async_trait]
impl EstimatorConnection for RedisConnection {
    async fn set_add(&self, key: &str, member: &str) -> CounterResult<bool> {
        let mut conn = self.conn.clone();
        let added: i64 = self.timed(conn.sadd(key, member)).await?;
        Ok(added > 0)
    }

    async fn set_members(&self, key: &str) -> CounterResult<HashSet<String>> {
        let mut conn = self.conn.clone();
        self.timed(conn.smembers(key)).await
    }

    async fn hash_incr_by(&self, key: &str, field: &str, delta: i64) -> CounterResult<i64> {
        let mut conn = self.conn.clone();
        self.timed(conn.hincr(key, field, delta)).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> CounterResult<Option<String>> {
        let mut conn = self.conn.clone();
        self.timed(conn.hget(key, field)).await
    }

    async fn pf_add(&self, key: &str, member: &str) -> CounterResult<bool> {
        let mut conn = self.conn.clone();
        let changed: i64 = self.timed(conn.pfadd(key, member)).await?;
        Ok(changed > 0)
    }

    async fn pf_count(&self, key: &str) -> CounterResult<u64> {
        let mut conn = self.conn.clone();
        self.timed(conn.pfcount(key)).await
    }

    async fn ping(&self) -> CounterResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = self
            .timed(redis::cmd("PING").query_async(&mut conn))
            .await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(CounterError::Backend(format!("unexpected PING reply: {pong}")))
        }
    }
}
