use axum::Json;
use axum::Router;
use axum::http::StatusCode as AxumStatus;
use axum::routing::post;

use super::*;
use crate::test_support::{client, serve};

// =============================================================================
// parse_login_grant
// =============================================================================

#[test]
fn parses_nested_admin_service_response() {
    let body = json!({
        "access_token": "jwt-abc",
        "token_type": "bearer",
        "admin": {
            "admin_id": "8d2e",
            "username": "root",
            "full_name": "Root Admin",
            "is_active": true
        }
    });
    let grant = parse_login_grant(&body, RoleRule::Default(RoleDefault::Admin)).unwrap();
    assert_eq!(grant.token.as_deref(), Some("jwt-abc"));
    assert_eq!(grant.user.id, UserId::Text("8d2e".to_owned()));
    assert_eq!(grant.user.username, "root");
    assert_eq!(grant.user.full_name.as_deref(), Some("Root Admin"));
    assert_eq!(grant.user.role, Some(Role::Admin));
    assert_eq!(grant.user.extra.get("is_active"), Some(&Value::Bool(true)));
}

#[test]
fn parses_flat_relay_response_and_forces_admin() {
    let body = json!({
        "token": "relay-tok",
        "admin_id": 12,
        "username": "relay",
        "full_name": "Relay Operator",
        "role": "operator"
    });
    let grant = parse_login_grant(&body, RoleRule::ForceAdmin).unwrap();
    assert_eq!(grant.token.as_deref(), Some("relay-tok"));
    assert_eq!(grant.user.id, UserId::Int(12));
    assert_eq!(grant.user.role, Some(Role::Admin));
    assert!(grant.user.extra.is_empty());
}

#[test]
fn response_role_wins_over_default() {
    let body = json!({ "token": "t", "id": 3, "username": "op", "role": "operator" });
    let grant = parse_login_grant(&body, RoleRule::Default(RoleDefault::Admin)).unwrap();
    assert_eq!(grant.user.role, Some(Role::Operator));
}

#[test]
fn client_portal_defaults_to_client_role() {
    let body = json!({
        "access_token": "c-tok",
        "client": { "client_id": "c-1", "client_username": "acme", "company_name": "Acme" }
    });
    let grant = parse_login_grant(&body, RoleRule::Default(RoleDefault::Client)).unwrap();
    assert_eq!(grant.user.username, "acme");
    assert_eq!(grant.user.role, Some(Role::Client));
    assert_eq!(grant.user.extra["company_name"], "Acme");
}

#[test]
fn missing_token_is_reported_as_none() {
    let body = json!({ "admin_id": 1, "username": "a", "token": "" });
    let grant = parse_login_grant(&body, RoleRule::ForceAdmin).unwrap();
    assert!(grant.token.is_none());
}

#[test]
fn missing_identity_fields_are_decode_errors() {
    let err = parse_login_grant(&json!({ "token": "t", "username": "a" }), RoleRule::ForceAdmin).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));

    let err = parse_login_grant(&json!({ "token": "t", "id": 1 }), RoleRule::ForceAdmin).unwrap_err();
    assert!(err.to_string().contains("username"));

    let err = parse_login_grant(&json!("ok"), RoleRule::ForceAdmin).unwrap_err();
    assert!(err.to_string().contains("not a JSON object"));
}

// =============================================================================
// endpoints
// =============================================================================

#[tokio::test]
async fn admin_login_posts_credentials() {
    let router = Router::new().route(
        "/admin/login",
        post(|Json(body): Json<Value>| async move {
            if body["username"] == "root" && body["password"] == "pw" {
                (
                    AxumStatus::OK,
                    Json(json!({
                        "access_token": "jwt",
                        "token_type": "bearer",
                        "admin": { "admin_id": "a1", "username": "root" }
                    })),
                )
            } else {
                (AxumStatus::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" })))
            }
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base);

    let grant = api.admin_login("root", "pw").await.unwrap();
    assert_eq!(grant.token.as_deref(), Some("jwt"));
    assert_eq!(grant.user.username, "root");

    let err = api.admin_login("root", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn client_login_sends_client_username() {
    let router = Router::new().route(
        "/api/client-management/auth/login",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "access_token": "ct",
                "client": { "client_id": "c9", "client_username": body["client_username"] }
            }))
        }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base);

    let grant = api.client_login("acme", "pw").await.unwrap();
    assert_eq!(grant.user.username, "acme");
    assert_eq!(grant.user.role, Some(Role::Client));
}

#[tokio::test]
async fn login_does_not_store_token_by_itself() {
    let router = Router::new().route(
        "/api/admin/auth/login",
        post(|| async { Json(json!({ "token": "rt", "admin_id": 1, "username": "r" })) }),
    );
    let base = serve(router).await;
    let (api, _) = client(&base);

    api.edge_relay_login("r", "pw").await.unwrap();
    assert!(!api.is_authenticated());
}
