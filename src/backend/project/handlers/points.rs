//! Point Handlers
//!
//! Upsert and delete of single points.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::project::{Feature, UpsertPointRequest};
use crate::shared::ChangeEvent;

/// Create or replace a point (POST /api/points)
///
/// The body is `{ properties: { id, ...attrs }, geometry }`. Responds with the
/// point as stored, rendered as a feature.
///
/// # Errors
///
/// * `400 Bad Request` - If `properties.id` or `geometry` is missing
pub async fn upsert_point(
    State(state): State<AppState>,
    payload: Result<Json<UpsertPointRequest>, JsonRejection>,
) -> Result<Json<Feature>, BackendError> {
    let Json(request) = payload?;
    let point = request.into_point()?;

    state.repository.upsert_point(&point).await?;

    let feature = point.into_feature();
    state.broadcaster.publish(&ChangeEvent::point_update(&feature));

    Ok(Json(feature))
}

/// Delete a point (DELETE /api/points/{id})
///
/// Succeeds whether or not the point existed.
pub async fn delete_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, BackendError> {
    let existed = state.repository.delete_point(&id).await?;
    if !existed {
        tracing::debug!("[Project] Delete of unknown point {}", id);
    }

    state.broadcaster.publish(&ChangeEvent::point_delete(&id));

    Ok(Json(json!({ "success": true })))
}
