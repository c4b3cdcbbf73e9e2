/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Real-time WebSocket endpoint
 * 2. API routes (project, points, health)
 * 3. Fallback to static pages
 */

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::backend::realtime::socket::handle_realtime_socket;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Repository and broadcaster shared by all handlers
/// * `config` - Supplies the static pages directory and the body limit
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router<()> {
    let router = Router::new().route("/ws", get(handle_realtime_socket));

    // Add API routes
    let router = configure_api_routes(router, config.max_body_bytes);

    // Static pages for everything else
    let router = router.fallback_service(ServeDir::new(&config.static_dir));

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
