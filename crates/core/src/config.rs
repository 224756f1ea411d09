//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Overall deadline for a single request in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Number of ids resolved per board request when `limit` is absent.
    #[serde(default = "default_board_limit")]
    pub default_board_limit: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_board_limit() -> usize {
    crate::DEFAULT_BOARD_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
            request_timeout_secs: default_request_timeout_secs(),
            default_board_limit: default_board_limit(),
        }
    }
}

impl ServerConfig {
    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("server.request_timeout_secs must be at least 1".to_string());
        }
        if self.default_board_limit == 0 || self.default_board_limit > crate::MAX_BOARD_LIMIT {
            return Err(format!(
                "server.default_board_limit must be between 1 and {}",
                crate::MAX_BOARD_LIMIT
            ));
        }
        Ok(())
    }
}

/// Estimator backend selection for the counter store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CounterBackendConfig {
    /// Redis-compatible server providing sets, hashes and HyperLogLog.
    Redis {
        /// Connection URL (e.g., "redis://127.0.0.1:6379/0").
        url: String,
        /// Timeout for establishing a connection in milliseconds.
        #[serde(default = "default_redis_connect_timeout_ms")]
        connect_timeout_ms: u64,
        /// Timeout for a single command response in milliseconds.
        #[serde(default = "default_redis_response_timeout_ms")]
        response_timeout_ms: u64,
    },
    /// In-process estimator (single instance deployments and tests only).
    Memory,
}

fn default_redis_connect_timeout_ms() -> u64 {
    1_000
}

fn default_redis_response_timeout_ms() -> u64 {
    500
}

impl Default for CounterBackendConfig {
    fn default() -> Self {
        Self::Redis {
            url: "redis://127.0.0.1:6379/0".to_string(),
            connect_timeout_ms: default_redis_connect_timeout_ms(),
            response_timeout_ms: default_redis_response_timeout_ms(),
        }
    }
}

/// Analytics counter store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Estimator backend.
    #[serde(default)]
    pub backend: CounterBackendConfig,
    /// Prefix prepended to every key written to the backend.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Connection attempts per connect sequence (default: 3).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Upper bound of the random sleep between attempts in milliseconds (default: 5000).
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

fn default_key_prefix() -> String {
    "readom:".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_max_jitter_ms() -> u64 {
    5_000
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            backend: CounterBackendConfig::default(),
            key_prefix: default_key_prefix(),
            retry_attempts: default_retry_attempts(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

impl CounterConfig {
    /// In-process backend with no reconnect delay.
    pub fn memory() -> Self {
        Self {
            backend: CounterBackendConfig::Memory,
            max_jitter_ms: 0,
            ..Default::default()
        }
    }

    /// Get the maximum reconnect jitter as a Duration.
    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }

    /// Validate counter configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_attempts == 0 {
            return Err("counter.retry_attempts must be at least 1".to_string());
        }
        if let CounterBackendConfig::Redis { url, .. } = &self.backend
            && !(url.starts_with("redis://")
                || url.starts_with("rediss://")
                || url.starts_with("redis+unix://")
                || url.starts_with("unix://"))
        {
            return Err(format!("counter.backend.url has unsupported scheme: {url}"));
        }
        Ok(())
    }
}

/// Durable item store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemStoreConfig {
    /// SQLite database file.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL.
        url: String,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        /// Statement timeout in milliseconds.
        #[serde(default)]
        statement_timeout_ms: Option<u64>,
    },
}

fn default_max_connections() -> u32 {
    10
}

impl Default for ItemStoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/items.db"),
        }
    }
}

impl ItemStoreConfig {
    /// Validate item store configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ItemStoreConfig::Sqlite { .. } => Ok(()),
            ItemStoreConfig::Postgres {
                url,
                max_connections,
                ..
            } => {
                if url.is_empty() {
                    return Err("items.url cannot be empty".to_string());
                }
                if *max_connections == 0 {
                    return Err("items.max_connections must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Upstream news API configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API, ending with a slash.
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_upstream_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0/".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Item retention configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Row count above which a sweep deletes rows (default: 10,000).
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: u64,
    /// Rows deleted per sweep (default: 1,000).
    #[serde(default = "default_retention_batch_size")]
    pub batch_size: u64,
    /// Run the sweep automatically on this interval (disabled when unset).
    #[serde(default)]
    pub auto_interval_secs: Option<u64>,
}

fn default_high_water_mark() -> u64 {
    10_000
}

fn default_retention_batch_size() -> u64 {
    1_000
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            high_water_mark: default_high_water_mark(),
            batch_size: default_retention_batch_size(),
            auto_interval_secs: None,
        }
    }
}

impl RetentionConfig {
    /// Get the automatic sweep interval, if enabled.
    pub fn auto_interval(&self) -> Option<Duration> {
        self.auto_interval_secs.map(Duration::from_secs)
    }

    /// Validate retention configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("retention.batch_size must be at least 1".to_string());
        }
        if self.auto_interval_secs == Some(0) {
            return Err("retention.auto_interval_secs cannot be 0".to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Analytics counter store configuration.
    #[serde(default)]
    pub counter: CounterConfig,
    /// Item store configuration.
    #[serde(default)]
    pub items: ItemStoreConfig,
    /// Upstream API configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Item retention configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses the in-process counter backend and the
    /// default SQLite item store path.
    pub fn for_testing() -> Self {
        Self {
            counter: CounterConfig::memory(),
            ..Default::default()
        }
    }

    /// Validate every section, returning the first error found.
    pub fn validate(&self) -> crate::Result<()> {
        self.server
            .validate()
            .and_then(|_| self.counter.validate())
            .and_then(|_| self.items.validate())
            .and_then(|_| self.retention.validate())
            .map_err(crate::Error::Config)
    }
}
