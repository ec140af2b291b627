mod support;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower::ServiceExt;

use service::auth::TokenIssuer;
use support::{app_with_db, call, SECRET};

// None of these reach the database.
fn app() -> axum::Router {
    app_with_db(DatabaseConnection::Disconnected)
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = call(&app(), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_token_is_401_json() {
    for uri in ["/tasks", "/labels", "/users/me", "/views/list", "/events", "/tasks/abc"] {
        let (status, body) = call(&app(), "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Unauthorized");
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn bad_tokens_are_401() {
    let (status, _) = call(&app(), "GET", "/tasks", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = TokenIssuer::new("some-other-secret", chrono::Duration::hours(1)).issue(1).unwrap();
    let (status, _) = call(&app(), "GET", "/tasks", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = TokenIssuer::new(SECRET, chrono::Duration::hours(-2)).issue(1).unwrap();
    let (status, _) = call(&app(), "GET", "/tasks", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app(), "GET", "/events?access_token=nope", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn basic_auth_scheme_rejected() {
    let req = Request::builder()
        .uri("/tasks")
        .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_login_body_is_400() {
    let req = Request::builder()
        .method("POST")
        .uri("/authenticate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{"))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&to_bytes(resp.into_body(), 1 << 16).await.unwrap()).unwrap();
    assert_eq!(body["error"], "Bad Request");
    assert!(body["detail"].as_str().is_some());
}

#[tokio::test]
async fn metrics_and_docs_are_served() {
    let _ = call(&app(), "GET", "/health", None, None).await;
    let resp = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), 1 << 20).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("todo_http_requests_total"));

    let (status, doc) = call(&app(), "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/tasks"].is_object());
}

#[tokio::test]
async fn unknown_paths_fall_back_to_static() {
    // no client bundle in the test tree
    let (status, _) = call(&app(), "GET", "/week", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
