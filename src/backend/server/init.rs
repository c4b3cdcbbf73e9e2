/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store loading, state creation and route configuration.
 *
 * # Initialization Process
 *
 * 1. Open the connection pool and migrate the schema (fatal on failure)
 * 2. Create the repository and the change broadcaster
 * 3. Create and configure the router
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Errors
///
/// Returns the store error when the pool cannot be opened or the schema
/// migration fails; the server must not start in that case.
pub async fn create_app(config: &AppConfig) -> Result<Router<()>, sqlx::Error> {
    tracing::info!("Initializing plancollab backend server");

    let pool = load_database(config).await?;
    let app_state = AppState::new(pool);

    tracing::info!("Repository and change broadcaster initialized");

    let app = create_router(app_state, config);

    tracing::info!("Router configured");

    Ok(app)
}
