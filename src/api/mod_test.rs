use axum::Json;
use axum::Router;
use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
use axum::routing::{delete, get, post};
use serde_json::json;

use super::*;
use crate::storage::MemoryStorage;
use crate::test_support::{client, serve};

fn header_str(headers: &AxumHeaders, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map_or(Value::Null, |v| Value::String(v.to_owned()))
}

fn backend() -> Router {
    Router::new()
        .route("/api/ok", get(|| async { Json(json!({ "ok": true })) }))
        .route("/api/gone", delete(|| async { AxumStatus::NO_CONTENT }))
        .route(
            "/api/missing",
            get(|| async { (AxumStatus::NOT_FOUND, Json(json!({ "detail": "not found" }))) }),
        )
        .route(
            "/api/relay-error",
            get(|| async { (AxumStatus::BAD_REQUEST, Json(json!({ "message": "bad input" }))) }),
        )
        .route(
            "/api/both",
            get(|| async { (AxumStatus::CONFLICT, Json(json!({ "message": "m", "detail": "d" }))) }),
        )
        .route(
            "/api/validation",
            get(|| async {
                (
                    AxumStatus::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": [{ "loc": ["body", "name"], "msg": "field required" }] })),
                )
            }),
        )
        .route("/api/boom", get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "oops") }))
        .route("/health", get(|| async { "healthy" }))
        .route(
            "/api/echo-headers",
            get(|headers: AxumHeaders| async move {
                Json(json!({
                    "authorization": header_str(&headers, "authorization"),
                    "content_type": header_str(&headers, "content-type"),
                    "x_trace": header_str(&headers, "x-trace"),
                }))
            }),
        )
        .route("/api/echo-body", post(|Json(body): Json<Value>| async move { Json(body) }))
}

// =============================================================================
// response normalization
// =============================================================================

#[tokio::test]
async fn json_response_is_parsed() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let resp = api.request("/api/ok", RequestOptions::get()).await.unwrap();
    assert_eq!(resp, ApiResponse::Json { status: 200, data: json!({ "ok": true }) });
}

#[tokio::test]
async fn no_content_resolves_to_null() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let resp = api.request("/api/gone", RequestOptions::delete()).await.unwrap();
    assert!(resp.is_no_content());
    assert_eq!(resp.status(), 204);

    let value = api.send_json(Method::DELETE, "/api/gone", None).await.unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn non_json_success_returns_text_and_status() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let resp = api.request("/health", RequestOptions::get()).await.unwrap();
    assert_eq!(resp, ApiResponse::Text { status: 200, body: "healthy".to_owned() });
}

#[tokio::test]
async fn request_json_decodes_typed_body() {
    #[derive(Debug, serde::Deserialize)]
    struct OkBody {
        ok: bool,
    }

    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let body: Option<OkBody> = api.request_json("/api/ok", RequestOptions::get()).await.unwrap();
    assert!(body.unwrap().ok);

    let none: Option<OkBody> = api.request_json("/api/gone", RequestOptions::delete()).await.unwrap();
    assert!(none.is_none());

    let err = api
        .request_json::<OkBody>("/health", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================================
// error messages
// =============================================================================

#[tokio::test]
async fn not_found_uses_detail_message() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let err = api.request("/api/missing", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.to_string(), "not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn message_field_is_used_when_no_detail() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let err = api.request("/api/relay-error", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.to_string(), "bad input");
}

#[tokio::test]
async fn detail_wins_over_message() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let err = api.request("/api/both", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.to_string(), "d");
}

#[tokio::test]
async fn structured_detail_is_rendered_as_json() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let err = api.request("/api/validation", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("field required"));
}

#[tokio::test]
async fn plain_error_body_falls_back_to_status_text() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let err = api.request("/api/boom", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn unknown_route_falls_back_to_status_text() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let err = api.request("/api/nope", RequestOptions::get()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 404: Not Found");
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let (api, _) = client("http://127.0.0.1:1");
    let err = api.request("/api/ok", RequestOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn error_message_ignores_empty_detail() {
    let msg = error::error_message(StatusCode::BAD_GATEWAY, r#"{"detail":"","message":"upstream down"}"#);
    assert_eq!(msg, "upstream down");
}

// =============================================================================
// headers
// =============================================================================

#[tokio::test]
async fn anonymous_request_sends_json_content_type_only() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let value = api.get("/api/echo-headers").await.unwrap();
    assert_eq!(value["content_type"], "application/json");
    assert_eq!(value["authorization"], Value::Null);
}

#[tokio::test]
async fn bearer_token_is_injected() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);
    api.set_token("tok123").unwrap();

    let value = api.get("/api/echo-headers").await.unwrap();
    assert_eq!(value["authorization"], "Bearer tok123");
}

#[tokio::test]
async fn caller_headers_merge_but_cannot_override_auth() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);
    api.set_token("real").unwrap();

    let options = RequestOptions::get()
        .with_header("x-trace", "abc")
        .unwrap()
        .with_header("authorization", "Bearer forged")
        .unwrap()
        .with_header("content-type", "text/plain")
        .unwrap();
    let value = api.request("/api/echo-headers", options).await.unwrap().into_value();
    assert_eq!(value["x_trace"], "abc");
    assert_eq!(value["authorization"], "Bearer real");
    assert_eq!(value["content_type"], "application/json");
}

#[tokio::test]
async fn json_body_round_trips() {
    let base = serve(backend()).await;
    let (api, _) = client(&base);

    let value = api
        .send_json(Method::POST, "/api/echo-body", Some(json!({ "name": "cam-01" })))
        .await
        .unwrap();
    assert_eq!(value, json!({ "name": "cam-01" }));
}

#[test]
fn invalid_header_is_rejected() {
    let err = RequestOptions::get().with_header("bad header", "v").unwrap_err();
    assert!(matches!(err, ApiError::InvalidHeader(_)));
}

// =============================================================================
// token management
// =============================================================================

#[test]
fn set_and_clear_token_mirror_storage() {
    let (api, storage) = client("http://localhost:9004");
    assert!(!api.is_authenticated());

    api.set_token("tok").unwrap();
    assert!(api.is_authenticated());
    assert_eq!(api.token().as_deref(), Some("tok"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));

    api.clear_token().unwrap();
    assert!(!api.is_authenticated());
    assert_eq!(api.token(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn empty_token_is_not_authenticated() {
    let (api, _) = client("http://localhost:9004");
    api.set_token("").unwrap();
    assert!(!api.is_authenticated());
}

#[test]
fn constructor_loads_persisted_token() {
    let storage = Arc::new(MemoryStorage::with_entries([(TOKEN_KEY, "persisted")]));
    let api = ApiClient::new("http://localhost:9004/", Timeouts::default(), storage).unwrap();
    assert_eq!(api.token().as_deref(), Some("persisted"));
    assert_eq!(api.base_url(), "http://localhost:9004");
}
