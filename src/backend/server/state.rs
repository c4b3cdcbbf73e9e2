/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` owns the two process-scoped resources created at startup:
 * - the project repository (and through it the connection pool)
 * - the change broadcaster (the set of connected real-time clients)
 *
 * Both are cheap to clone and are handed to handlers through Axum state
 * rather than living in globals.
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::project::db::ProjectRepository;
use crate::backend::realtime::broadcast::ChangeBroadcaster;

/// Shared state of every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Data access for the project and its points
    pub repository: ProjectRepository,
    /// Fan-out to connected WebSocket clients
    pub broadcaster: ChangeBroadcaster,
}

impl AppState {
    /// Build the state over a migrated pool with a fresh broadcaster
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: ProjectRepository::new(pool),
            broadcaster: ChangeBroadcaster::default(),
        }
    }
}

impl FromRef<AppState> for ProjectRepository {
    fn from_ref(state: &AppState) -> Self {
        state.repository.clone()
    }
}

impl FromRef<AppState> for ChangeBroadcaster {
    fn from_ref(state: &AppState) -> Self {
        state.broadcaster.clone()
    }
}
