/**
 * Project Handlers
 *
 * HTTP handlers for the project as a whole: snapshot reads, plan
 * replacement, settings updates and full imports. Each write calls the
 * repository once and, only after it has committed, publishes one change
 * event. The HTTP result never depends on the broadcast.
 */

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::backend::error::BackendError;
use crate::backend::project::db::ProjectRepository;
use crate::backend::server::state::AppState;
use crate::shared::project::{ImportRequest, ProjectSnapshot, PropertyMap, ReplacePlanRequest};
use crate::shared::{ChangeEvent, SettingsPatch};

/// Return the project and its points (GET /api/project)
pub async fn get_project(
    State(repository): State<ProjectRepository>,
) -> Result<Json<ProjectSnapshot>, BackendError> {
    let snapshot = repository.fetch_snapshot().await?;
    tracing::debug!(
        "[Project] Snapshot with {} points",
        snapshot.geojson_data.features.len()
    );
    Ok(Json(snapshot))
}

/// Replace the plan image (POST /api/project/plan)
///
/// Clears the plan corners and every point.
///
/// # Errors
///
/// * `400 Bad Request` - If `planDataUrl` is missing or empty
/// * `500 Internal Server Error` - If the transaction fails
pub async fn replace_plan(
    State(state): State<AppState>,
    payload: Result<Json<ReplacePlanRequest>, JsonRejection>,
) -> Result<Json<Value>, BackendError> {
    let Json(request) = payload?;
    let plan_data_url = request
        .plan_data_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| BackendError::handler(StatusCode::BAD_REQUEST, "planDataUrl is required"))?;

    state
        .repository
        .replace_plan(&plan_data_url, request.width, request.height)
        .await?;

    state.broadcaster.publish(&ChangeEvent::plan_update(
        &plan_data_url,
        request.width,
        request.height,
    ));

    Ok(Json(json!({ "success": true })))
}

/// Update some of `point_schema`, `plan_corners`, `opacity` (POST /api/project/settings)
///
/// # Errors
///
/// * `400 Bad Request` - If no recognized field is present or one has the wrong type
pub async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<PropertyMap>, JsonRejection>,
) -> Result<Json<Value>, BackendError> {
    let Json(body) = payload?;
    let patch = SettingsPatch::from_body(&body)?;

    state.repository.update_settings(&patch).await?;

    state
        .broadcaster
        .publish(&ChangeEvent::settings_update(&patch));

    Ok(Json(json!({ "success": true })))
}

/// Replace the project and all its points (POST /api/project/import)
pub async fn import_project(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<Value>, BackendError> {
    let Json(request) = payload?;

    let imported = state
        .repository
        .import_project(&request.project, &request.geojson_data.features)
        .await?;

    state.broadcaster.publish(&ChangeEvent::project_import());

    Ok(Json(json!({ "success": true, "imported": imported })))
}

/// Report whether the store answers (GET /api/health)
pub async fn health(
    State(repository): State<ProjectRepository>,
) -> Result<Json<Value>, BackendError> {
    repository.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
