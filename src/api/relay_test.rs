use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::{Method as AxumMethod, Uri};
use axum::routing::{any, get};
use serde_json::json;

use super::*;
use crate::test_support::{client, serve};

fn relay_backend() -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/status", get(|| async { Json(json!({ "status": "running" })) }))
        .route("/api/admin/cameras", get(|uri: Uri| async move { Json(json!({ "query": uri.query() })) }))
        .route("/api/admin/alerts", get(|uri: Uri| async move { Json(json!({ "query": uri.query() })) }))
        .route(
            "/api/admin/config",
            any(|method: AxumMethod| async move { Json(json!({ "method": method.as_str() })) }),
        )
        .route(
            "/api/admin/{resource}/{id}",
            any(|method: AxumMethod, Path((resource, id)): Path<(String, String)>| async move {
                Json(json!({ "method": method.as_str(), "resource": resource, "id": id }))
            }),
        )
}

#[tokio::test]
async fn health_accepts_plain_text() {
    let base = serve(relay_backend()).await;
    let (api, _) = client(&base);

    assert_eq!(api.health().await.unwrap(), json!("OK"));
    assert_eq!(api.system_status().await.unwrap()["status"], "running");
}

#[tokio::test]
async fn cameras_filter_by_server() {
    let base = serve(relay_backend()).await;
    let (api, _) = client(&base);

    assert_eq!(api.cameras(None).await.unwrap()["query"], Value::Null);
    assert_eq!(api.cameras(Some("srv-1")).await.unwrap()["query"], "server_id=srv-1");
}

#[tokio::test]
async fn alert_filters_become_query_parameters() {
    let base = serve(relay_backend()).await;
    let (api, _) = client(&base);

    let alerts = api
        .alerts(&[("severity", "high"), ("acknowledged", "false")])
        .await
        .unwrap();
    assert_eq!(alerts["query"], "severity=high&acknowledged=false");
}

#[tokio::test]
async fn resource_mutations_use_expected_methods() {
    let base = serve(relay_backend()).await;
    let (api, _) = client(&base);

    let updated = api.update_local_server("s1", json!({ "name": "gate" })).await.unwrap();
    assert_eq!(updated, json!({ "method": "PUT", "resource": "servers", "id": "s1" }));

    let deleted = api.delete_camera("cam-3").await.unwrap();
    assert_eq!(deleted, json!({ "method": "DELETE", "resource": "cameras", "id": "cam-3" }));

    let alert = api.update_alert("al-9", json!({ "acknowledged": true })).await.unwrap();
    assert_eq!(alert["resource"], "alerts");

    let relay_client = api.delete_relay_client("rc-1").await.unwrap();
    assert_eq!(relay_client["resource"], "clients");
}

#[tokio::test]
async fn system_config_read_and_write() {
    let base = serve(relay_backend()).await;
    let (api, _) = client(&base);

    assert_eq!(api.system_config().await.unwrap()["method"], "GET");
    let written = api.update_system_config(json!({ "retention_days": 30 })).await.unwrap();
    assert_eq!(written["method"], "PUT");
}
