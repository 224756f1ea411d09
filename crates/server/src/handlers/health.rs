//! Health endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub counter: &'static str,
}

/// GET /v1/health - Health check.
///
/// Fails when the item store is unreachable. A counter outage only degrades
/// the status since visit counting is best effort.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.items.health_check().await?;

    let (status, counter) = match state.counter.health_check().await {
        Ok(()) => ("ok", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Counter store health check failed");
            ("degraded", "unavailable")
        }
    };

    Ok(Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        counter,
    }))
}
