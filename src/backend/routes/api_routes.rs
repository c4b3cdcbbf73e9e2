/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Project
 * - `GET /api/project` - Project snapshot with its points
 * - `POST /api/project/plan` - Replace the plan image (clears points), raised body limit
 * - `POST /api/project/settings` - Partial settings update
 * - `POST /api/project/import` - Replace the whole project, raised body limit
 *
 * ## Points
 * - `POST /api/points` - Upsert a point
 * - `DELETE /api/points/{id}` - Delete a point
 *
 * ## Health
 * - `GET /api/health` - Store round-trip
 */

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::backend::project::handlers::{
    delete_point, get_project, health, import_project, replace_plan, update_settings,
    upsert_point,
};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Plan and import bodies embed the plan image, so those two routes accept
/// up to `max_body_bytes` instead of axum's default limit.
pub fn configure_api_routes(router: Router<AppState>, max_body_bytes: usize) -> Router<AppState> {
    router
        // Project endpoints
        .route("/api/project", get(get_project))
        .route(
            "/api/project/plan",
            post(replace_plan).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route("/api/project/settings", post(update_settings))
        .route(
            "/api/project/import",
            post(import_project).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        // Point endpoints
        .route("/api/points", post(upsert_point))
        .route("/api/points/{id}", delete(delete_point))
        // Store health
        .route("/api/health", get(health))
}
