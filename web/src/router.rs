//! Router configuration.

use crate::handlers::{health, items, jobs, lists};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures:
/// - Service routes (`/`, `/health`, `/ready`, `/metrics`)
/// - List and item CRUD under `/api/todolists`
/// - Job status under `/api/jobs`
///
/// Every route is wrapped in the correlation-id layer and `TraceLayer`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Lists
        .route("/todolists", get(lists::list_all).post(lists::create_list))
        .route(
            "/todolists/:list_id",
            get(lists::get_list)
                .put(lists::update_list)
                .delete(lists::delete_list),
        )
        // Items
        .route(
            "/todolists/:list_id/items",
            get(items::list_items).post(items::create_item),
        )
        .route(
            "/todolists/:list_id/items/complete-all",
            post(items::complete_all),
        )
        .route(
            "/todolists/:list_id/items/:item_id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route(
            "/todolists/:list_id/items/:item_id/toggle",
            patch(items::toggle_item),
        )
        // Jobs
        .route("/jobs/:job_id", get(jobs::get_job));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
