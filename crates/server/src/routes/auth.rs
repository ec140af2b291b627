use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use sea_orm::DatabaseConnection;
use tracing::warn;

use service::auth::domain::{AuthSession, LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::auth::TokenIssuer;
use service::events::ChangeHub;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::metrics::LOGINS_TOTAL;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub hub: ChangeHub,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, tokens: TokenIssuer, hub: ChangeHub) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let auth = Arc::new(AuthService::new(repo, tokens, AuthConfig::default()));
        Self { db, auth, hub }
    }
}

/// The authenticated caller, inserted by [`require_bearer_token_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
}

#[utoipa::path(
    post, path = "/users", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Registered and signed in", body = crate::openapi::SessionDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn signup(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<AuthSession>), JsonApiError> {
    let session = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post, path = "/authenticate", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = crate::openapi::SessionDoc),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn authenticate(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthSession>, JsonApiError> {
    match state.auth.login(input).await {
        Ok(session) => {
            LOGINS_TOTAL.with_label_values(&["success"]).inc();
            Ok(Json(session))
        }
        Err(e) => {
            LOGINS_TOTAL.with_label_values(&["failure"]).inc();
            Err(e.into())
        }
    }
}

/// `Authorization: Bearer <token>`, or `?access_token=` for clients that cannot set headers.
fn extract_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let value = h.to_str().map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(JsonApiError::unauthorized("expected Authorization: Bearer <token>")),
        };
    }
    let from_query = req.uri().query().and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.strip_prefix("access_token="))
            .find(|t| !t.is_empty())
            .map(str::to_string)
    });
    Ok(from_query)
}

/// Rejects requests without a valid token and records the caller as [`CurrentUser`].
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_owned();
    let Some(token) = extract_token(&req)? else {
        warn!(path = %path, "missing bearer token");
        return Err(JsonApiError::unauthorized("missing bearer token"));
    };
    let claims = state.auth.tokens().verify(&token).map_err(|e| {
        warn!(path = %path, err = %e, "token validation failed");
        JsonApiError::unauthorized("invalid or expired token")
    })?;
    // tokens outlive deleted accounts
    let user = state.auth.user(claims.uid).await.map_err(|e| match e {
        service::auth::errors::AuthError::NotFound => JsonApiError::unauthorized("account no longer exists"),
        other => other.into(),
    })?;
    req.extensions_mut().insert(CurrentUser { id: user.id });
    Ok(next.run(req).await)
}
