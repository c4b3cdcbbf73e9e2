//! Real-time Update Module
//!
//! This module pushes change notifications to connected clients over
//! WebSocket whenever a write commits.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Change broadcaster (fan-out to connections)
//! └── socket.rs       - WebSocket upgrade and per-connection forwarding
//! ```
//!
//! # Delivery Contract
//!
//! Broadcasts happen after the write has committed and are never part of the
//! write's outcome. There is no acknowledgment and no backlog: reconnecting
//! clients re-fetch `GET /api/project`.

/// Event broadcasting
pub mod broadcast;

/// WebSocket subscription handler
pub mod socket;

// Re-export commonly used types and functions
pub use broadcast::ChangeBroadcaster;
pub use socket::handle_realtime_socket;
