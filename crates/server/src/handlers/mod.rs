//! HTTP request handlers.

pub mod admin;
pub mod boards;
pub mod health;
pub mod items;
pub mod stats;

pub use admin::*;
pub use boards::*;
pub use health::*;
pub use items::*;
pub use stats::*;

use crate::error::ApiResult;
use crate::metrics::{ITEM_LOOKUPS, PAGE_VISITS, PAGE_VISITS_DROPPED};
use crate::state::AppState;
use crate::visitor::VisitorId;
use axum::extract::State;
use readom_core::{ItemView, PageTag};
use readom_counter::VisitOutcome;

/// Page tag for the landing route.
pub const HOME_PAGE: &str = "home";

/// Page tag for single item views.
pub const ITEM_PAGE: &str = "item";

/// GET / - Service banner.
pub async fn root(State(state): State<AppState>, visitor: VisitorId) -> &'static str {
    if let Ok(page) = PageTag::new(HOME_PAGE) {
        record_visit(&state, &visitor, &page).await;
    }
    "Readom API Server"
}

/// Count a visit. Counter outages drop the visit and never fail the request.
pub(crate) async fn record_visit(state: &AppState, visitor: &VisitorId, page: &PageTag) {
    let outcome = state.counter.record_visit(visitor.as_str(), page).await;
    match outcome {
        VisitOutcome::Recorded => PAGE_VISITS.with_label_values(&[page.as_str()]).inc(),
        VisitOutcome::Dropped => PAGE_VISITS_DROPPED
            .with_label_values(&[page.as_str()])
            .inc(),
    }
    tracing::debug!(
        page = %page,
        anonymous = visitor.is_anonymous(),
        outcome = ?outcome,
        "Visit counted"
    );
}

/// Resolve an item for display, falling back to a placeholder.
pub(crate) async fn resolve_view(state: &AppState, id: i64) -> ApiResult<ItemView> {
    let lookup = state.items.resolve(id).await?;
    ITEM_LOOKUPS.with_label_values(&[lookup.label()]).inc();
    Ok(lookup
        .into_row()
        .map(ItemView::from)
        .unwrap_or_else(|| ItemView::placeholder(id)))
}
