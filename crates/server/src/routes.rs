pub mod auth;
pub mod events;
pub mod labels;
pub mod tasks;
pub mod users;
pub mod views;

use axum::{
    body::Body,
    http::Request,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::metrics;
use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics_text() -> impl IntoResponse {
    metrics::encode_metrics()
}

/// Build the full application router: public, protected, docs and the static client.
/// Request span with the path only; the query may carry `access_token`.
fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!("request", method = %req.method(), path = %req.uri().path(), version = ?req.version())
}

pub fn build_router(state: ServerState, cors: CorsLayer, frontend_dir: &str) -> Router {
    let index = format!("{}/index.html", frontend_dir.trim_end_matches('/'));
    let static_dir = ServeDir::new(frontend_dir).fallback(ServeFile::new(index));

    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/users", post(auth::signup))
        .route("/authenticate", post(auth::authenticate));

    let protected = Router::new()
        .route("/users/me", get(users::me).put(users::update_me).delete(users::delete_me))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/:id", get(tasks::get).put(tasks::update).delete(tasks::delete))
        .route("/tasks/:id/labels", get(tasks::labels).put(tasks::set_labels))
        .route("/labels", get(labels::list).post(labels::create))
        .route("/labels/:id", get(labels::get).put(labels::update).delete(labels::delete))
        .route("/labels/:id/tasks", get(labels::tasks))
        .route("/views/week", get(views::week))
        .route("/views/month", get(views::month))
        .route("/views/list", get(views::list))
        .route("/events", get(events::stream))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(metrics::track_http))
        .fallback_service(static_dir)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_span_leaves_out_the_query() {
        let req = Request::builder().uri("/events?access_token=secret.jwt.value").body(Body::empty()).unwrap();
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = request_span(&req);
            let fields: Vec<&str> = span.metadata().unwrap().fields().iter().map(|f| f.name()).collect();
            assert_eq!(fields, vec!["method", "path", "version"]);
        });
    }
}
