//! Project and Point Data Model
//!
//! Types for the single project, its points, and the GeoJSON-style feature
//! collection used on the wire. Point properties are an open mapping of
//! attribute name to arbitrary JSON, checked only when they cross the wire.
//!
//! The `id` of a point lives in its own column. It is stripped from the
//! property bag before storage and put back when a point is rendered as a
//! [`Feature`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::SharedError;

/// Identifier of the one and only project
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Plan overlay opacity used until a client changes it
pub const DEFAULT_OPACITY: f64 = 0.7;

/// Open mapping of attribute name to JSON value
pub type PropertyMap = serde_json::Map<String, Value>;

/// The singleton project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub plan_data_url: Option<String>,
    pub plan_width: Option<f64>,
    pub plan_height: Option<f64>,
    /// Geographic corners the plan image is pinned to
    pub plan_corners: Option<Value>,
    /// Ordered attribute definitions; rendered by clients, not enforced here
    pub point_schema: Value,
    pub opacity: f64,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROJECT_ID.to_string(),
            plan_data_url: None,
            plan_width: None,
            plan_height: None,
            plan_corners: None,
            point_schema: Value::Array(Vec::new()),
            opacity: DEFAULT_OPACITY,
        }
    }
}

/// A point rendered as a GeoJSON feature, `id` included in `properties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: PropertyMap,
    pub geometry: Value,
}

/// GeoJSON envelope for the points of the project
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// Response body of `GET /api/project`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project: Project,
    #[serde(rename = "geojsonData")]
    pub geojson_data: FeatureCollection,
}

/// A point as it is stored: `id` in its own field, never in `properties`
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub id: String,
    pub properties: PropertyMap,
    pub geometry: Value,
}

impl PointRecord {
    /// Build a record, dropping any `id` entry from the property bag
    pub fn new(id: String, mut properties: PropertyMap, geometry: Value) -> Self {
        properties.remove("id");
        Self {
            id,
            properties,
            geometry,
        }
    }

    /// Parse a client-supplied feature (`{ properties: { id, .. }, geometry }`)
    pub fn from_feature_value(value: &Value) -> Result<Self, SharedError> {
        let properties = match value.get("properties") {
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(SharedError::validation(
                    "properties",
                    "properties must be an object",
                ))
            }
            None => return Err(SharedError::validation("properties", "properties are required")),
        };
        let id = properties
            .get("id")
            .and_then(point_id_from)
            .ok_or_else(|| SharedError::validation("properties.id", "point id is required"))?;
        let geometry = match value.get("geometry") {
            Some(Value::Null) | None => {
                return Err(SharedError::validation("geometry", "geometry is required"))
            }
            Some(geometry) => geometry.clone(),
        };

        Ok(Self::new(id, properties, geometry))
    }

    /// Render as a feature, putting `id` back into the properties
    pub fn into_feature(self) -> Feature {
        let mut properties = self.properties;
        properties.insert("id".to_string(), Value::String(self.id));
        Feature {
            properties,
            geometry: self.geometry,
        }
    }
}

/// Normalize a client-supplied point id
///
/// Non-empty strings are used as-is and numbers by their decimal form.
/// Anything else is not a usable id.
pub fn point_id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Body of `POST /api/points`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertPointRequest {
    pub properties: Option<PropertyMap>,
    pub geometry: Option<Value>,
}

impl UpsertPointRequest {
    /// Validate presence of `properties.id` and `geometry`
    pub fn into_point(self) -> Result<PointRecord, SharedError> {
        let properties = self
            .properties
            .ok_or_else(|| SharedError::validation("properties", "properties are required"))?;
        let id = properties
            .get("id")
            .and_then(point_id_from)
            .ok_or_else(|| SharedError::validation("properties.id", "point id is required"))?;
        let geometry = match self.geometry {
            Some(Value::Null) | None => {
                return Err(SharedError::validation("geometry", "geometry is required"))
            }
            Some(geometry) => geometry,
        };

        Ok(PointRecord::new(id, properties, geometry))
    }
}

/// Body of `POST /api/project/plan`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplacePlanRequest {
    #[serde(rename = "planDataUrl")]
    pub plan_data_url: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Partial update of the project settings
///
/// `plan_corners` is doubly optional: absent leaves the column untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub point_schema: Option<Value>,
    pub plan_corners: Option<Option<Value>>,
    pub opacity: Option<f64>,
}

impl SettingsPatch {
    /// Pick the recognized fields out of a request body
    ///
    /// Unrecognized keys are ignored. A recognized key with the wrong JSON
    /// type is a validation error.
    pub fn from_body(body: &PropertyMap) -> Result<Self, SharedError> {
        let point_schema = match body.get("point_schema") {
            None => None,
            Some(schema) => {
                validate_point_schema(schema)?;
                Some(schema.clone())
            }
        };
        let plan_corners = body.get("plan_corners").map(|corners| match corners {
            Value::Null => None,
            corners => Some(corners.clone()),
        });
        let opacity = match body.get("opacity") {
            None => None,
            Some(value) => Some(value.as_f64().ok_or_else(|| {
                SharedError::validation("opacity", "opacity must be a number")
            })?),
        };

        Ok(Self {
            point_schema,
            plan_corners,
            opacity,
        })
    }

    /// True when no recognized field was supplied
    pub fn is_empty(&self) -> bool {
        self.point_schema.is_none() && self.plan_corners.is_none() && self.opacity.is_none()
    }

    /// The supplied fields as a JSON object
    pub fn to_payload(&self) -> Value {
        let mut payload = PropertyMap::new();
        if let Some(schema) = &self.point_schema {
            payload.insert("point_schema".to_string(), schema.clone());
        }
        if let Some(corners) = &self.plan_corners {
            payload.insert(
                "plan_corners".to_string(),
                corners.clone().unwrap_or(Value::Null),
            );
        }
        if let Some(opacity) = self.opacity {
            payload.insert("opacity".to_string(), Value::from(opacity));
        }
        Value::Object(payload)
    }
}

/// Checks a point schema value the same way for settings updates and imports
fn validate_point_schema(schema: &Value) -> Result<(), SharedError> {
    if schema.is_array() {
        Ok(())
    } else {
        Err(SharedError::validation(
            "point_schema",
            "point_schema must be an array",
        ))
    }
}

/// Project fields carried by an import
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportProject {
    #[serde(alias = "planDataUrl")]
    pub plan_data_url: Option<String>,
    #[serde(alias = "planWidth")]
    pub plan_width: Option<f64>,
    #[serde(alias = "planHeight")]
    pub plan_height: Option<f64>,
    #[serde(alias = "planCorners")]
    pub plan_corners: Option<Value>,
    #[serde(alias = "pointSchema")]
    pub point_schema: Option<Value>,
    pub opacity: Option<f64>,
}

impl ImportProject {
    /// Reject project fields that a later snapshot could not render
    ///
    /// A missing or null `point_schema` is stored as an empty list.
    pub fn validate(&self) -> Result<(), SharedError> {
        match &self.point_schema {
            None | Some(Value::Null) => Ok(()),
            Some(schema) => validate_point_schema(schema),
        }
    }
}

/// Feature list of an import, kept as raw JSON so each feature is
/// validated inside the import transaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportFeatures {
    #[serde(default)]
    pub features: Vec<Value>,
}

/// Body of `POST /api/project/import`
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    pub project: ImportProject,
    #[serde(rename = "geojsonData", default)]
    pub geojson_data: ImportFeatures,
}
