//! The analytics counter store.
//!
//! Records page views and unique visitors per page and UTC day, and produces
//! reconciled reports. The store owns a connector and at most one live
//! connection; every public operation pings that connection first and reruns
//! the full connect sequence if it is gone.

use crate::error::{CounterError, CounterResult};
use crate::keys::KeySpace;
use crate::report::{DailyCounts, PageReport, Report};
use crate::traits::{EstimatorConnection, EstimatorConnector};
use rand::Rng;
use readom_core::PageTag;
use readom_core::config::CounterConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
        }
    }
}

/// Result of a best-effort visit recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    Recorded,
    Dropped,
}

/// Tunables for the counter store.
#[derive(Debug, Clone)]
pub struct CounterOptions {
    pub key_prefix: String,
    pub retry_attempts: u32,
    pub max_jitter: Duration,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self::from(&CounterConfig::default())
    }
}

impl From<&CounterConfig> for CounterOptions {
    fn from(config: &CounterConfig) -> Self {
        Self {
            key_prefix: config.key_prefix.clone(),
            retry_attempts: config.retry_attempts.max(1),
            max_jitter: config.max_jitter(),
        }
    }
}

/// Page view and unique visitor counters.
pub struct CounterStore {
    connector: Arc<dyn EstimatorConnector>,
    keys: KeySpace,
    options: CounterOptions,
    connection: RwLock<Option<Arc<dyn EstimatorConnection>>>,
    state: AtomicU8,
    /// Bumped after every completed connect sequence, successful or not.
    generation: AtomicU64,
    reconnect_lock: Mutex<()>,
}

impl CounterStore {
    /// Create the store and attempt the initial connection.
    ///
    /// A failed initial connection is logged, not returned; the store stays
    /// `Disconnected` and retries on the next operation.
    pub async fn new(connector: Arc<dyn EstimatorConnector>, options: CounterOptions) -> Self {
        let store = Self::new_disconnected(connector, options);
        if let Err(e) = store.reconnect(0).await {
            warn!(
                backend = store.connector.backend_name(),
                error = %e,
                "Counter store starting disconnected"
            );
        }
        store
    }

    /// Create the store without connecting.
    pub fn new_disconnected(connector: Arc<dyn EstimatorConnector>, options: CounterOptions) -> Self {
        Self {
            connector,
            keys: KeySpace::new(options.key_prefix.clone()),
            options,
            connection: RwLock::new(None),
            state: AtomicU8::new(ConnectionState::Disconnected.as_u8()),
            generation: AtomicU64::new(0),
            reconnect_lock: Mutex::new(()),
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn backend_name(&self) -> &'static str {
        self.connector.backend_name()
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Check that the backend is reachable, reconnecting if needed.
    pub async fn health_check(&self) -> CounterResult<()> {
        self.connection().await.map(|_| ())
    }

    /// Record a visit for today, dropping it if the backend is unavailable.
    pub async fn record_visit(&self, visitor_id: &str, page: &PageTag) -> VisitOutcome {
        match self.try_record_visit(visitor_id, page).await {
            Ok(()) => VisitOutcome::Recorded,
            Err(e) => {
                warn!(page = %page, error = %e, "Dropping page visit");
                VisitOutcome::Dropped
            }
        }
    }

    /// Record a visit for today.
    pub async fn try_record_visit(&self, visitor_id: &str, page: &PageTag) -> CounterResult<()> {
        self.try_record_visit_on(visitor_id, page, today()).await
    }

    /// Record a visit on an explicit date.
    ///
    /// Updates `page` and the `_ALL` aggregate (once if `page` is `_ALL`).
    #[instrument(skip(self, visitor_id), fields(page = %page, date = %date))]
    pub async fn try_record_visit_on(
        &self,
        visitor_id: &str,
        page: &PageTag,
        date: Date,
    ) -> CounterResult<()> {
        let conn = self.connection().await?;
        let date = date.to_string();

        self.record_on(conn.as_ref(), visitor_id, page, &date).await?;
        if !page.is_all() {
            self.record_on(conn.as_ref(), visitor_id, &PageTag::all(), &date)
                .await?;
        }
        debug!("Visit recorded");
        Ok(())
    }

    async fn record_on(
        &self,
        conn: &dyn EstimatorConnection,
        visitor_id: &str,
        page: &PageTag,
        date: &str,
    ) -> CounterResult<()> {
        conn.set_add(&self.keys.page_list(), page.as_str()).await?;
        conn.set_add(&self.keys.date_list(page), date).await?;
        conn.hash_incr_by(&self.keys.page_views(page), date, 1)
            .await?;
        if conn
            .pf_add(&self.keys.visitor_estimator(page, date), visitor_id)
            .await?
        {
            conn.hash_incr_by(&self.keys.unique_visitors(page), date, 1)
                .await?;
        }
        Ok(())
    }

    /// Reconcile and report every recorded page.
    #[instrument(skip(self))]
    pub async fn report(&self) -> CounterResult<Report> {
        let conn = self.connection().await?;

        let mut pages: Vec<PageTag> = Vec::new();
        for name in conn.set_members(&self.keys.page_list()).await? {
            match PageTag::new(name.as_str()) {
                Ok(tag) => pages.push(tag),
                Err(e) => warn!(page = %name, error = %e, "Skipping malformed page tag"),
            }
        }
        if !pages.iter().any(PageTag::is_all) {
            pages.push(PageTag::all());
        }
        pages.sort();

        let mut report = Report::default();
        for page in pages {
            let page_report = self.reconcile_page(conn.as_ref(), &page).await?;
            report.insert(page, page_report);
        }
        Ok(report)
    }

    /// Reconcile and report a single page.
    #[instrument(skip(self), fields(page = %page))]
    pub async fn page_report(&self, page: &PageTag) -> CounterResult<PageReport> {
        let conn = self.connection().await?;
        self.reconcile_page(conn.as_ref(), page).await
    }

    async fn reconcile_page(
        &self,
        conn: &dyn EstimatorConnection,
        page: &PageTag,
    ) -> CounterResult<PageReport> {
        let pv_key = self.keys.page_views(page);
        let uv_key = self.keys.unique_visitors(page);

        let mut days = Vec::new();
        for raw in conn.set_members(&self.keys.date_list(page)).await? {
            let Some(date) = parse_date(&raw) else {
                warn!(page = %page, date = %raw, "Skipping malformed date entry");
                continue;
            };
            let field = date.to_string();

            let page_views = read_count(conn, &pv_key, &field).await?;
            let estimate = conn
                .pf_count(&self.keys.visitor_estimator(page, &field))
                .await?;
            let mut unique_visitors = read_count(conn, &uv_key, &field).await?;

            if estimate > unique_visitors {
                let delta = i64::try_from(estimate - unique_visitors).map_err(|_| {
                    CounterError::Backend(format!("estimate out of range: {estimate}"))
                })?;
                let updated = conn.hash_incr_by(&uv_key, &field, delta).await?;
                unique_visitors = u64::try_from(updated).unwrap_or(estimate);
            } else if estimate < unique_visitors {
                warn!(
                    page = %page,
                    date = %field,
                    estimate,
                    recorded = unique_visitors,
                    "Unique visitor estimate below recorded count"
                );
            }

            days.push((
                date,
                DailyCounts {
                    page_views,
                    unique_visitors,
                },
            ));
        }
        Ok(PageReport::new(days))
    }

    /// Current connection if it answers a ping, otherwise a fresh one.
    async fn connection(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        let observed = self.generation.load(Ordering::Acquire);
        let current = self.connection.read().await.clone();
        if let Some(conn) = current {
            match conn.ping().await {
                Ok(()) => return Ok(conn),
                Err(e) => debug!(error = %e, "Counter backend ping failed"),
            }
        }
        self.reconnect(observed).await
    }

    /// Run the connect sequence unless another caller finished one since
    /// `observed`, in which case its outcome is reused.
    async fn reconnect(&self, observed: u64) -> CounterResult<Arc<dyn EstimatorConnection>> {
        let _guard = self.reconnect_lock.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            return self
                .connection
                .read()
                .await
                .clone()
                .ok_or(CounterError::Unavailable {
                    attempts: self.options.retry_attempts,
                });
        }

        self.set_state(ConnectionState::Connecting);
        let result = self.connect_with_retry().await;
        match &result {
            Ok(conn) => {
                *self.connection.write().await = Some(conn.clone());
                self.set_state(ConnectionState::Connected);
                info!(backend = self.connector.backend_name(), "Counter store connected");
            }
            Err(_) => {
                *self.connection.write().await = None;
                self.set_state(ConnectionState::Disconnected);
            }
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        result
    }

    async fn connect_with_retry(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        let mut remaining = self.options.retry_attempts;
        while remaining > 0 {
            match self.connect_and_seed().await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    remaining -= 1;
                    warn!(
                        backend = self.connector.backend_name(),
                        attempts_left = remaining,
                        error = %e,
                        "Counter backend connection attempt failed"
                    );
                    if remaining > 0 {
                        let pause = self.jitter();
                        if !pause.is_zero() {
                            tokio::time::sleep(pause).await;
                        }
                    }
                }
            }
        }
        Err(CounterError::Unavailable {
            attempts: self.options.retry_attempts,
        })
    }

    async fn connect_and_seed(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        let conn = self.connector.connect().await?;
        conn.set_add(&self.keys.page_list(), PageTag::ALL).await?;
        Ok(conn)
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.options.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}

async fn read_count(conn: &dyn EstimatorConnection, key: &str, field: &str) -> CounterResult<u64> {
    match conn.hash_get(key, field).await? {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| CounterError::InvalidValue {
            key: key.to_string(),
            field: field.to_string(),
            value,
        }),
    }
}
