//! Item endpoints.

use super::{ITEM_PAGE, record_visit, resolve_view};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::visitor::VisitorId;
use axum::Json;
use axum::extract::{Path, Query, State};
use readom_core::item::parse_item_id;
use readom_core::{ItemView, PageTag};
use readom_items::ItemFilter;
use serde::Deserialize;

/// GET /v1/items/{id} - Resolve one item.
///
/// Unknown or unusable items render as a placeholder rather than an error.
pub async fn get_item(
    State(state): State<AppState>,
    visitor: VisitorId,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemView>> {
    let id = parse_item_id(&id)?;
    record_visit(&state, &visitor, &PageTag::new(ITEM_PAGE)?).await;
    Ok(Json(resolve_view(&state, id).await?))
}

/// Query parameters for listing stored items.
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub top: Option<bool>,
    #[serde(default)]
    pub include_deleted: bool,
    pub limit: Option<u32>,
}

/// GET /v1/items - List locally stored items.
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> ApiResult<Json<Vec<ItemView>>> {
    let filter = ItemFilter {
        is_top: query.top,
        include_deleted: query.include_deleted,
        limit: query.limit,
    };
    let rows = state.items.list(&filter).await?;
    Ok(Json(rows.into_iter().map(ItemView::from).collect()))
}
