//! Shared Module
//!
//! This module contains the types exchanged between the server and its
//! clients: the project/points data model, the change events pushed over the
//! real-time channel, wire-level errors and the application configuration.
//!
//! # Overview
//!
//! Nothing in here touches the store or the HTTP stack, so these types
//! compile without the `ssr` feature.

/// Project, point and feature collection types
pub mod project;

/// Change events pushed to real-time clients
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use project::{
    Feature, FeatureCollection, PointRecord, Project, ProjectSnapshot, PropertyMap,
    SettingsPatch, DEFAULT_PROJECT_ID,
};
pub use event::{ChangeEvent, EventType};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
