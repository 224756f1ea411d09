//! Administrative endpoints.

use crate::error::ApiResult;
use crate::metrics::{CLEANUP_DELETED, CLEANUP_RUNS};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use readom_items::{CleanupReport, ItemCache, ItemStoreResult, RetentionPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// POST /v1/admin/cleanup - Run a retention sweep.
pub async fn trigger_cleanup(State(state): State<AppState>) -> ApiResult<Json<CleanupReport>> {
    let report = run_cleanup(&state.items, &state.retention_policy()).await?;
    Ok(Json(report))
}

/// Run one retention sweep and record its outcome.
pub async fn run_cleanup(
    items: &ItemCache,
    policy: &RetentionPolicy,
) -> ItemStoreResult<CleanupReport> {
    let result = items.cleanup(policy).await;
    match &result {
        Ok(report) => {
            let status = match report {
                CleanupReport::Clean { .. } => "clean",
                CleanupReport::Noop => "noop",
            };
            CLEANUP_RUNS.with_label_values(&[status]).inc();
            CLEANUP_DELETED.inc_by(report.deleted());
        }
        Err(_) => CLEANUP_RUNS.with_label_values(&["failed"]).inc(),
    }
    result
}

/// Spawn a background task that sweeps on a fixed interval.
pub fn spawn_retention_task(
    items: Arc<ItemCache>,
    policy: RetentionPolicy,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            interval_secs = interval.as_secs(),
            high_water_mark = policy.high_water_mark,
            "Retention scheduler started"
        );
        loop {
            tokio::time::sleep(interval).await;
            match run_cleanup(&items, &policy).await {
                Ok(report) => {
                    tracing::debug!(deleted = report.deleted(), "Scheduled retention sweep finished")
                }
                Err(e) => tracing::error!(error = %e, "Scheduled retention sweep failed"),
            }
        }
    })
}
