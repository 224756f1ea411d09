//! Visit statistics endpoints.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use readom_core::PageTag;
use readom_counter::{PageReport, Report};

/// GET /v1/stats - Report for every known page.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<Report>> {
    Ok(Json(state.counter.report().await?))
}

/// GET /v1/stats/{page} - Report for one page.
pub async fn get_page_stats(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> ApiResult<Json<PageReport>> {
    let page = PageTag::new(page)?;
    Ok(Json(state.counter.page_report(&page).await?))
}
