//! Backend Module
//!
//! This module contains all server-side code: the Axum HTTP server, the
//! SQLite-backed project repository and the WebSocket change broadcaster.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, store loading
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`project`** - Schema management, repository and HTTP handlers
//! - **`realtime`** - Change broadcasting over WebSocket
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── project/        - Schema, repository, handlers
//! ├── realtime/       - Change broadcasting
//! └── error/          - Error types
//! ```
//!
//! # Write Path
//!
//! handler → repository (transaction where several statements) → commit →
//! broadcaster → every connected client, including the writer. The HTTP
//! response does not wait on, or depend on, the broadcast.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Project and points
pub mod project;

/// Real-time update system
pub mod realtime;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use server::{create_app, AppState};
pub use project::{ProjectRepository, RepositoryError};
pub use realtime::ChangeBroadcaster;
pub use error::BackendError;
