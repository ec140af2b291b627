use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use models::label;
use service::calendar;
use service::db::task_service::{self, NewTask, TaskFilter, TaskPatch, TaskWithLabels};
use service::events::{ChangeEvent, ChangeKind};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::metrics::TASKS_CREATED_TOTAL;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// RFC 3339, RFC 2822 or `YYYY-MM-DD`
    pub start: Option<String>,
    pub end: Option<String>,
    pub is_done: Option<bool>,
}

impl ListQuery {
    fn into_filter(self) -> Result<TaskFilter, JsonApiError> {
        let parse = |raw: Option<String>| {
            raw.filter(|s| !s.trim().is_empty())
                .map(|s| calendar::parse_instant(&s))
                .transpose()
                .map_err(|e| JsonApiError::bad_request(e.to_string()))
        };
        Ok(TaskFilter { start: parse(self.start)?, end: parse(self.end)?, is_done: self.is_done })
    }
}

#[utoipa::path(get, path = "/tasks", tag = "tasks", security(("bearer" = [])), params(ListQuery),
    responses((status = 200, description = "Tasks ordered by due date"), (status = 400, description = "Bad query")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<TaskWithLabels>>, JsonApiError> {
    let filter = q.into_filter()?;
    let tasks = task_service::list_tasks(&state.db, me.id, &filter).await?;
    Ok(Json(tasks))
}

#[utoipa::path(post, path = "/tasks", tag = "tasks", security(("bearer" = [])),
    request_body = crate::openapi::NewTaskDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<NewTask>,
) -> Result<(StatusCode, Json<TaskWithLabels>), JsonApiError> {
    let created = task_service::create_task(&state.db, me.id, input).await?;
    TASKS_CREATED_TOTAL.inc();
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::TaskCreated, created.task.id));
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/tasks/{id}", tag = "tasks", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Task id")),
    responses((status = 200, description = "Task"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<TaskWithLabels>, JsonApiError> {
    Ok(Json(task_service::get_task(&state.db, me.id, id).await?))
}

#[utoipa::path(put, path = "/tasks/{id}", tag = "tasks", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Task id")),
    request_body = crate::openapi::TaskPatchDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> Result<Json<TaskWithLabels>, JsonApiError> {
    let updated = task_service::update_task(&state.db, me.id, id, patch).await?;
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::TaskUpdated, id));
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/tasks/{id}", tag = "tasks", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Task id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, JsonApiError> {
    task_service::delete_task(&state.db, me.id, id).await?;
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::TaskDeleted, id));
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/tasks/{id}/labels", tag = "tasks", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Task id")),
    responses((status = 200, description = "Labels of the task"), (status = 404, description = "Not Found")))]
pub async fn labels(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Vec<label::Model>>, JsonApiError> {
    Ok(Json(task_service::task_labels(&state.db, me.id, id).await?))
}

#[utoipa::path(put, path = "/tasks/{id}/labels", tag = "tasks", security(("bearer" = [])),
    params(("id" = i32, Path, description = "Task id")),
    request_body = Vec<i32>,
    responses((status = 200, description = "New label set"), (status = 400, description = "Unknown label"), (status = 404, description = "Not Found")))]
pub async fn set_labels(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(label_ids): ApiJson<Vec<i32>>,
) -> Result<Json<Vec<label::Model>>, JsonApiError> {
    let labels = task_service::set_task_labels(&state.db, me.id, id, label_ids).await?;
    info!(task_id = id, count = labels.len(), "task labels set");
    state.hub.publish(ChangeEvent::new(me.id, ChangeKind::TaskLabels, id));
    Ok(Json(labels))
}
