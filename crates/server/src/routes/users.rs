use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tracing::info;

use models::user;
use service::auth::errors::AuthError;
use service::db::user_service::{self, ProfilePatch};
use service::events::{ChangeEvent, ChangeKind};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::auth::{CurrentUser, ServerState};

/// Profile changes; a new `password` needs the `current_password`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
}

#[utoipa::path(get, path = "/users/me", tag = "users", security(("bearer" = [])),
    responses((status = 200, description = "Profile"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::get_profile(&state.db, me.id).await?))
}

#[utoipa::path(put, path = "/users/me", tag = "users", security(("bearer" = [])),
    request_body = crate::openapi::UpdateMeDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 401, description = "Unauthorized")))]
pub async fn update_me(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<UpdateMeInput>,
) -> Result<Json<user::Model>, JsonApiError> {
    // reject a bad profile before the password is touched
    let patch = ProfilePatch { first_name: input.first_name, last_name: input.last_name };
    patch.validate()?;
    if let Some(new_password) = input.password.as_deref() {
        let current = input
            .current_password
            .as_deref()
            .ok_or_else(|| JsonApiError::bad_request("current_password is required to change the password"))?;
        state.auth.change_password(me.id, current, new_password).await.map_err(|e| match e {
            AuthError::Unauthorized => JsonApiError::bad_request("current_password is incorrect"),
            other => other.into(),
        })?;
    }
    let updated = user_service::update_profile(&state.db, me.id, patch).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/users/me", tag = "users", security(("bearer" = [])),
    responses((status = 204, description = "Account deleted"), (status = 401, description = "Unauthorized")))]
pub async fn delete_me(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> Result<StatusCode, JsonApiError> {
    user_service::delete_user(&state.db, me.id).await?;
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::UserDeleted, me.id));
    info!(user_id = me.id, "account_deleted");
    Ok(StatusCode::NO_CONTENT)
}
