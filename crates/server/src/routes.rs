//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/v1/health", get(handlers::health_check))
        // Items
        .route("/v1/items", get(handlers::list_items))
        .route("/v1/items/{id}", get(handlers::get_item))
        .route("/v1/boards/{board}", get(handlers::get_board))
        // Visit statistics
        .route("/v1/stats", get(handlers::get_stats))
        .route("/v1/stats/{page}", get(handlers::get_page_stats))
        // Admin
        .route("/v1/admin/cleanup", post(handlers::trigger_cleanup));

    let mut router = Router::new().merge(api_routes);

    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    router
        .layer(TimeoutLayer::new(state.config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
