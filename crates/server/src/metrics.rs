//! Prometheus metrics for the Readom server.
//!
//! Exposes visit counting, item cache, retention and upstream latency metrics.
//! The `/metrics` endpoint is unauthenticated and should be restricted to
//! scrapers at the network level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Visit counting
pub static PAGE_VISITS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "readom_page_visits_total",
            "Total page visits recorded in the counter store",
        ),
        &["page"],
    )
    .expect("metric creation failed")
});

pub static PAGE_VISITS_DROPPED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "readom_page_visits_dropped_total",
            "Total page visits dropped because the counter store was unavailable",
        ),
        &["page"],
    )
    .expect("metric creation failed")
});

// Item cache
pub static ITEM_LOOKUPS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "readom_item_lookups_total",
            "Total item lookups by outcome (hit, fetched, unavailable)",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static TOP_RANKED_ITEMS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "readom_top_ranked_items_total",
        "Total items newly marked as top ranked",
    )
    .expect("metric creation failed")
});

// Retention
pub static CLEANUP_RUNS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("readom_cleanup_runs_total", "Total retention sweeps by status"),
        &["status"],
    )
    .expect("metric creation failed")
});

pub static CLEANUP_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "readom_cleanup_deleted_total",
        "Total items deleted by retention sweeps",
    )
    .expect("metric creation failed")
});

// Upstream
pub static UPSTREAM_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "readom_upstream_request_duration_seconds",
            "Upstream news API request latency in seconds",
        )
        .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["operation"],
    )
    .expect("metric creation failed")
});

pub static UPSTREAM_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "readom_upstream_errors_total",
            "Total failed upstream requests by operation",
        ),
        &["operation"],
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(PAGE_VISITS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(PAGE_VISITS_DROPPED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ITEM_LOOKUPS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TOP_RANKED_ITEMS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CLEANUP_RUNS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CLEANUP_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPSTREAM_REQUEST_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPSTREAM_ERRORS.clone()))
            .expect("metric registration failed");
    });
}

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}
