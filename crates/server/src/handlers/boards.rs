//! Board endpoints.

use super::{record_visit, resolve_view};
use crate::error::{ApiError, ApiResult};
use crate::metrics::TOP_RANKED_ITEMS;
use crate::state::AppState;
use crate::visitor::VisitorId;
use axum::Json;
use axum::extract::{Path, Query, State};
use futures::{StreamExt, TryStreamExt, stream};
use readom_core::{Board, ItemView, MAX_BOARD_LIMIT, PageTag};
use serde::Deserialize;

/// Items resolved concurrently per board request.
const BOARD_RESOLVE_CONCURRENCY: usize = 8;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub limit: Option<usize>,
}

/// GET /v1/boards/{board} - Resolve the first `limit` items of a board.
///
/// For `topstories` the returned ids are marked top ranked before they are
/// resolved. Ids that cannot be resolved render as placeholders.
pub async fn get_board(
    State(state): State<AppState>,
    visitor: VisitorId,
    Path(board): Path<String>,
    Query(query): Query<BoardQuery>,
) -> ApiResult<Json<Vec<ItemView>>> {
    let board: Board = board.parse()?;
    let limit = query
        .limit
        .unwrap_or(state.config.server.default_board_limit)
        .clamp(1, MAX_BOARD_LIMIT);

    record_visit(&state, &visitor, &PageTag::new(board.as_str())?).await;

    let ids = state
        .items
        .source()
        .fetch_board(board)
        .await
        .map_err(|e| ApiError::Upstream(format!("failed to fetch {board}: {e}")))?;
    let ids: Vec<i64> = ids.into_iter().take(limit).collect();

    if board.assigns_top_rank() {
        let ranked = state.items.mark_top_ranked(&ids).await?;
        TOP_RANKED_ITEMS.inc_by(ranked);
    }

    let views = stream::iter(ids)
        .map(|id| resolve_view(&state, id))
        .buffered(BOARD_RESOLVE_CONCURRENCY)
        .try_collect::<Vec<_>>()
        .await?;

    let unresolved = views.iter().filter(|view| !view.is_populated()).count();
    tracing::debug!(
        board = %board,
        count = views.len(),
        unresolved,
        "Resolved board"
    );
    Ok(Json(views))
}
