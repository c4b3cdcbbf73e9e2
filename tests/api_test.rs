//! HTTP API integration tests

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::TryRecvError;

use plancollab::backend::routes::create_router;

use common::{create_test_app, create_test_state, delete, get, post, test_config};

fn exit_point() -> Value {
    json!({
        "properties": { "id": "p1", "label": "Exit" },
        "geometry": { "type": "Point", "coordinates": [10, 20] }
    })
}

#[tokio::test]
async fn test_point_roundtrip_through_snapshot() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    let (status, body) = post(&app, "/api/points", exit_point()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"]["id"], "p1");

    let (status, snapshot) = get(&app, "/api/project").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["geojsonData"]["type"], "FeatureCollection");

    let features = snapshot["geojsonData"]["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["type"], "Feature");
    assert_eq!(features[0]["properties"]["id"], "p1");
    assert_eq!(features[0]["properties"]["label"], "Exit");
    assert_eq!(
        features[0]["geometry"],
        json!({ "type": "Point", "coordinates": [10, 20] })
    );
}

#[tokio::test]
async fn test_fresh_project_snapshot() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    let (status, snapshot) = get(&app, "/api/project").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["project"]["id"], "default");
    assert_eq!(snapshot["project"]["opacity"], 0.7);
    assert_eq!(snapshot["project"]["point_schema"], json!([]));
    assert!(snapshot["project"]["plan_data_url"].is_null());
    assert_eq!(snapshot["geojsonData"]["features"], json!([]));
}

#[tokio::test]
async fn test_point_write_requires_id_and_geometry() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    let (status, body) = post(
        &app,
        "/api/points",
        json!({ "properties": { "label": "Exit" }, "geometry": { "type": "Point", "coordinates": [0, 0] } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    // Top-level id is not the accepted shape
    let (status, _) = post(
        &app,
        "/api/points",
        json!({ "id": "p1", "properties": { "label": "Exit" }, "geometry": { "type": "Point", "coordinates": [0, 0] } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/api/points", json!({ "properties": { "id": "p1" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    let (status, body) = common::send(
        &app,
        axum::http::Method::POST,
        "/api/points",
        Some(json!("not an object")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_unknown_point_succeeds() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    let (status, body) = delete(&app, "/api/points/never-existed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let message: Value = serde_json::from_str(&events.try_recv().unwrap()).unwrap();
    assert_eq!(
        message,
        json!({ "type": "point_delete", "payload": { "id": "never-existed" } })
    );
}

#[tokio::test]
async fn test_plan_replace_clears_points() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    for id in ["a", "b", "c"] {
        post(
            &app,
            "/api/points",
            json!({ "properties": { "id": id }, "geometry": { "type": "Point", "coordinates": [0, 0] } }),
        )
        .await;
    }
    post(
        &app,
        "/api/project/settings",
        json!({ "plan_corners": [[0, 0], [1, 0], [1, 1], [0, 1]] }),
    )
    .await;

    let (status, _) = post(
        &app,
        "/api/project/plan",
        json!({ "planDataUrl": "data:image/png;base64,AAAA", "width": 800, "height": 600 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, snapshot) = get(&app, "/api/project").await;
    assert_eq!(snapshot["geojsonData"]["features"], json!([]));
    assert_eq!(snapshot["project"]["plan_data_url"], "data:image/png;base64,AAAA");
    assert_eq!(snapshot["project"]["plan_width"], 800.0);
    assert!(snapshot["project"]["plan_corners"].is_null());
}

#[tokio::test]
async fn test_plan_upload_above_default_body_limit() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    // 3 MiB of base64, well past axum's 2 MB default
    let plan = format!("data:image/png;base64,{}", "A".repeat(3 * 1024 * 1024));

    let (status, body) = post(&app, "/api/project/plan", json!({ "planDataUrl": plan })).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let (_, snapshot) = get(&app, "/api/project").await;
    assert_eq!(snapshot["project"]["plan_data_url"].as_str(), Some(plan.as_str()));

    let (status, _) = post(
        &app,
        "/api/project/import",
        json!({ "project": { "plan_data_url": plan }, "geojsonData": { "features": [] } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_plan_upload_above_configured_limit() {
    let state = create_test_state().await;
    let config = plancollab::shared::AppConfig {
        max_body_bytes: 1024,
        ..test_config()
    };
    let app = create_router(state.clone(), &config);
    let mut events = state.broadcaster.subscribe();

    let plan = format!("data:image/png;base64,{}", "A".repeat(4096));
    let (status, _) = post(&app, "/api/project/plan", json!({ "planDataUrl": plan })).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, snapshot) = get(&app, "/api/project").await;
    assert!(snapshot["project"]["plan_data_url"].is_null());
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_plan_replace_requires_url() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    let (status, body) = post(&app, "/api/project/plan", json!({ "width": 10 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "planDataUrl is required");
}

#[tokio::test]
async fn test_opacity_only_settings() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    let schema = json!([{ "name": "label", "type": "text" }]);
    let corners = json!([[1, 1], [2, 1], [2, 2], [1, 2]]);
    post(
        &app,
        "/api/project/settings",
        json!({ "point_schema": schema, "plan_corners": corners }),
    )
    .await;

    let (status, _) = post(&app, "/api/project/settings", json!({ "opacity": 0.4 })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, snapshot) = get(&app, "/api/project").await;
    assert_eq!(snapshot["project"]["opacity"], 0.4);
    assert_eq!(snapshot["project"]["point_schema"], schema);
    assert_eq!(snapshot["project"]["plan_corners"], corners);
}

#[tokio::test]
async fn test_settings_without_recognized_fields() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    let (status, body) = post(&app, "/api/project/settings", json!({ "colour": "red" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No valid fields to update");

    let (status, _) = post(&app, "/api/project/settings", json!({ "opacity": "high" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_import_replaces_project() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    post(&app, "/api/points", exit_point()).await;

    let (status, body) = post(
        &app,
        "/api/project/import",
        json!({
            "project": {
                "plan_data_url": "data:imported",
                "plan_corners": [[0, 0], [5, 0], [5, 5], [0, 5]],
                "point_schema": [{ "name": "floor" }]
            },
            "geojsonData": {
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "properties": { "id": "x", "floor": 2 }, "geometry": { "type": "Point", "coordinates": [3, 4] } }
                ]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);

    let (_, snapshot) = get(&app, "/api/project").await;
    assert_eq!(snapshot["project"]["plan_data_url"], "data:imported");
    assert_eq!(snapshot["project"]["point_schema"], json!([{ "name": "floor" }]));
    let features = snapshot["geojsonData"]["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"], json!({ "id": "x", "floor": 2 }));
}

#[tokio::test]
async fn test_failed_import_leaves_state_untouched() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    post(&app, "/api/project/plan", json!({ "planDataUrl": "data:before" })).await;
    post(&app, "/api/points", exit_point()).await;
    let (_, before) = get(&app, "/api/project").await;
    while events.try_recv().is_ok() {}

    let (status, body) = post(
        &app,
        "/api/project/import",
        json!({
            "project": { "plan_data_url": "data:after" },
            "geojsonData": {
                "features": [
                    { "properties": { "id": "ok" }, "geometry": { "type": "Point", "coordinates": [0, 0] } },
                    { "properties": { "id": "broken" } }
                ]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("index 1"));

    let (_, after) = get(&app, "/api/project").await;
    assert_eq!(after, before);
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_import_rejects_non_list_schema() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    let (_, before) = get(&app, "/api/project").await;

    let (status, body) = post(
        &app,
        "/api/project/import",
        json!({ "project": { "point_schema": "label,floor" }, "geojsonData": { "features": [] } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("point_schema"));

    let (_, after) = get(&app, "/api/project").await;
    assert_eq!(after, before);
    assert_eq!(after["project"]["point_schema"], json!([]));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_each_connected_client_gets_one_notification() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut first = state.broadcaster.subscribe();
    let mut second = state.broadcaster.subscribe();

    post(&app, "/api/points", exit_point()).await;

    let mut late = state.broadcaster.subscribe();

    for client in [&mut first, &mut second] {
        let message: Value = serde_json::from_str(&client.try_recv().unwrap()).unwrap();
        assert_eq!(message["type"], "point_update");
        assert_eq!(message["payload"]["properties"]["id"], "p1");
        assert_eq!(client.try_recv(), Err(TryRecvError::Empty));
    }
    assert_eq!(late.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_every_write_emits_its_event_type() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    post(&app, "/api/project/plan", json!({ "planDataUrl": "data:x" })).await;
    post(&app, "/api/project/settings", json!({ "opacity": 0.9 })).await;
    post(&app, "/api/points", exit_point()).await;
    delete(&app, "/api/points/p1").await;
    post(
        &app,
        "/api/project/import",
        json!({ "project": {}, "geojsonData": { "features": [] } }),
    )
    .await;

    let mut kinds = Vec::new();
    while let Ok(message) = events.try_recv() {
        let message: Value = serde_json::from_str(&message).unwrap();
        kinds.push(message["type"].as_str().unwrap().to_string());
    }
    assert_eq!(
        kinds,
        vec![
            "plan_update",
            "settings_update",
            "point_update",
            "point_delete",
            "project_import"
        ]
    );
}

#[tokio::test]
async fn test_settings_event_carries_only_supplied_fields() {
    let state = create_test_state().await;
    let app = create_test_app(&state);
    let mut events = state.broadcaster.subscribe();

    post(&app, "/api/project/settings", json!({ "opacity": 0.5, "ignored": true })).await;

    let message: Value = serde_json::from_str(&events.try_recv().unwrap()).unwrap();
    assert_eq!(
        message,
        json!({ "type": "settings_update", "payload": { "opacity": 0.5 } })
    );
}

#[tokio::test]
async fn test_health() {
    let state = create_test_state().await;
    let app = create_test_app(&state);

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
