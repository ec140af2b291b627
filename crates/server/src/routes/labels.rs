use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};

use models::label;
use service::db::label_service::{self, LabelPatch, NewLabel};
use service::db::task_service::TaskWithLabels;
use service::events::{ChangeEvent, ChangeKind};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::routes::auth::{CurrentUser, ServerState};

#[utoipa::path(get, path = "/labels", tag = "labels", security(("bearer" = [])),
    responses((status = 200, description = "Labels ordered by name")))]
pub async fn list(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> Result<Json<Vec<label::Model>>, JsonApiError> {
    Ok(Json(label_service::list_labels(&state.db, me.id).await?))
}

#[utoipa::path(post, path = "/labels", tag = "labels", security(("bearer" = [])),
    request_body = crate::openapi::NewLabelDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<NewLabel>,
) -> Result<(StatusCode, Json<label::Model>), JsonApiError> {
    let created = label_service::create_label(&state.db, me.id, input).await?;
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::LabelCreated, created.id));
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/labels/{id}", tag = "labels", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Label id")),
    responses((status = 200, description = "Label"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<label::Model>, JsonApiError> {
    Ok(Json(label_service::get_label(&state.db, me.id, id).await?))
}

#[utoipa::path(put, path = "/labels/{id}", tag = "labels", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Label id")),
    request_body = crate::openapi::LabelPatchDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<LabelPatch>,
) -> Result<Json<label::Model>, JsonApiError> {
    let updated = label_service::update_label(&state.db, me.id, id, patch).await?;
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::LabelUpdated, id));
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/labels/{id}", tag = "labels", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Label id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, JsonApiError> {
    label_service::delete_label(&state.db, me.id, id).await?;
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::LabelDeleted, id));
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/labels/{id}/tasks", tag = "labels", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Label id")),
    responses((status = 200, description = "Tasks carrying the label"), (status = 404, description = "Not Found")))]
pub async fn tasks(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Vec<TaskWithLabels>>, JsonApiError> {
    Ok(Json(label_service::label_tasks(&state.db, me.id, id).await?))
}
