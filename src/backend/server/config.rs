/**
 * Server Configuration
 *
 * This module turns the application configuration into a ready store: it
 * opens the SQLite connection pool and runs the schema migration.
 *
 * # Error Handling
 *
 * Unlike optional services, the store is required. A pool that cannot be
 * opened or a migration that fails is returned to the caller, and startup
 * aborts.
 */

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::backend::project::schema;
use crate::shared::AppConfig;

/// Open the connection pool described by `config`
///
/// Foreign keys are switched on for every connection so that points cascade
/// with their project. An in-memory database lives and dies with its
/// connection, so such pools are pinned to one connection that is never
/// recycled.
pub async fn connect_pool(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if is_in_memory(&config.database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    pool_options.connect_with(options).await
}

/// Open the pool and bring the schema up to date
///
/// # Example
///
/// ```rust,no_run
/// use plancollab::backend::server::config::load_database;
/// use plancollab::shared::AppConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AppConfig::from_env()?;
/// let pool = load_database(&config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn load_database(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to database...");
    let pool = connect_pool(config).await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    if let Err(e) = schema::migrate(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        return Err(e);
    }

    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
