//! plancollab - Main Library
//!
//! plancollab is a small collaborative map-annotation backend. It stores a
//! single project (a floor-plan image, the corners it is pinned to, a
//! user-defined schema of point attributes and an overlay opacity) together
//! with a set of geo-referenced points, and pushes a notification to every
//! connected client whenever any of it changes.
//!
//! # Module Structure
//!
//! - **`shared`** - Types exchanged with clients
//!   - Project, point and GeoJSON feature types
//!   - Change events pushed over the real-time channel
//!   - Wire-level errors and application configuration
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket endpoint
//!   - Schema management and the SQLite-backed repository
//!   - Change broadcasting
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use plancollab::backend::server::init::create_app;
//! use plancollab::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Synchronization Contract
//!
//! Every successful write is followed by exactly one broadcast event. The
//! broadcast happens after commit, carries no delivery guarantee and never
//! changes the HTTP outcome. Clients that reconnect re-fetch the snapshot.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
