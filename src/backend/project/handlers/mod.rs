//! Project HTTP Handlers
//!
//! Thin translation from HTTP requests to repository calls and change
//! broadcasts. No business logic lives here.

/// Snapshot, plan, settings, import and health handlers
pub mod project;

/// Point upsert and delete handlers
pub mod points;

pub use points::{delete_point, upsert_point};
pub use project::{get_project, health, import_project, replace_plan, update_settings};
