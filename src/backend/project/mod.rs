//! Project Module
//!
//! Everything about the single project and its points on the server side:
//!
//! - **`schema`** - Table creation and in-place column upgrades at startup
//! - **`db`** - `ProjectRepository`, the data access layer
//! - **`handlers`** - HTTP handlers for the `/api/project` and `/api/points` routes
//!
//! # Transactions
//!
//! Plan replacement and project import touch several rows and run inside a
//! store transaction. All other writes are single statements. Concurrent
//! writers are not serialized in-process; the last write to commit wins.

/// Schema creation and migration
pub mod schema;

/// Repository over the connection pool
pub mod db;

/// HTTP handlers
pub mod handlers;

pub use db::{ProjectRepository, RepositoryError};
