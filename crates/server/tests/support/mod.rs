#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::routes::{self, auth::ServerState};
use service::auth::TokenIssuer;
use service::events::ChangeHub;

pub const SECRET: &str = "test-secret";

pub fn app_with_db(db: DatabaseConnection) -> Router {
    let tokens = TokenIssuer::new(SECRET, chrono::Duration::hours(1));
    let state = ServerState::new(db, tokens, ChangeHub::new(64));
    routes::build_router(state, CorsLayer::very_permissive(), "target/no-frontend")
}

/// Router backed by a migrated database; `None` skips the test.
pub async fn app() -> Option<Router> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let cfg = models::db::DatabaseConfig {
        url: models::db::DATABASE_URL.clone(),
        min_connections: 1,
        max_connections: 5,
        connect_timeout_secs: 3,
        acquire_timeout_secs: 5,
        ..Default::default()
    };
    let db = match models::db::connect_with_config(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {e}");
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {e}");
        return None;
    }
    Some(app_with_db(db))
}

pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &id[..12])
}

/// Sends one request; returns status and the body parsed as JSON (`Null` when empty or not JSON).
pub async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Signs up a fresh user and returns `(token, user id)`.
pub async fn signup(app: &Router, prefix: &str) -> (String, i64) {
    let body = serde_json::json!({
        "username": unique(prefix),
        "password": "Passw0rd!",
        "first_name": "Test",
        "last_name": "User",
    });
    let (status, json) = call(app, "POST", "/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    (json["token"].as_str().unwrap().to_string(), json["user"]["id"].as_i64().unwrap())
}
