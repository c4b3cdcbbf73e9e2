/**
 * Change Event System
 *
 * This module defines the events pushed to connected real-time clients after
 * a write has committed. Every event is a JSON object `{ type, payload? }`
 * where `type` names the kind of change.
 *
 * Events describe a change, they do not carry a backlog. A client that missed
 * one has to re-fetch the project snapshot.
 */
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::shared::project::{Feature, SettingsPatch};

/// Kind of change that was committed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A new plan image replaced the old one (all points were cleared)
    PlanUpdate,
    /// Some of `point_schema`, `plan_corners`, `opacity` changed
    SettingsUpdate,
    /// A point was created or replaced
    PointUpdate,
    /// A point was deleted
    PointDelete,
    /// The whole project was replaced by an import
    ProjectImport,
}

impl EventType {
    /// Wire name of the event type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlanUpdate => "plan_update",
            Self::SettingsUpdate => "settings_update",
            Self::PointUpdate => "point_update",
            Self::PointDelete => "point_delete",
            Self::ProjectImport => "project_import",
        }
    }
}

/// Change notification broadcast to every connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    /// Type of change
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Event payload, omitted from the wire when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ChangeEvent {
    /// Create a new change event
    pub fn new(event_type: EventType, payload: Option<Value>) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// Create a plan update event
    pub fn plan_update(plan_data_url: &str, width: Option<f64>, height: Option<f64>) -> Self {
        Self::new(
            EventType::PlanUpdate,
            Some(json!({
                "planDataUrl": plan_data_url,
                "width": width,
                "height": height,
            })),
        )
    }

    /// Create a settings update event carrying only the fields that changed
    pub fn settings_update(patch: &SettingsPatch) -> Self {
        Self::new(EventType::SettingsUpdate, Some(patch.to_payload()))
    }

    /// Create a point update event from the stored feature
    pub fn point_update(feature: &Feature) -> Self {
        Self::new(EventType::PointUpdate, Some(json!(feature)))
    }

    /// Create a point delete event
    pub fn point_delete(id: &str) -> Self {
        Self::new(EventType::PointDelete, Some(json!({ "id": id })))
    }

    /// Create a project import event
    ///
    /// Carries no payload: an import replaces everything, so clients re-fetch.
    pub fn project_import() -> Self {
        Self::new(EventType::ProjectImport, None)
    }
}
