use sea_orm::sea_query::NullOrdering;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order, QueryFilter, QueryOrder};
use serde::Deserialize;
use tracing::{info, instrument};

use models::label::{self, LabelChanges, DEFAULT_COLOR};
use models::task;

use crate::db::task_service::{self, TaskWithLabels};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_column: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_column: Option<bool>,
}

impl From<LabelPatch> for LabelChanges {
    fn from(p: LabelPatch) -> Self {
        LabelChanges { name: p.name, color: p.color, is_column: p.is_column }
    }
}

async fn owned_label(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<label::Model, ServiceError> {
    label::find_owned(db, user_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("label"))
}

/// A user's labels ordered by name.
pub async fn list_labels(db: &DatabaseConnection, user_id: i32) -> Result<Vec<label::Model>, ServiceError> {
    Ok(label::Entity::find()
        .filter(label::Column::UserId.eq(user_id))
        .order_by_asc(label::Column::Name)
        .order_by_asc(label::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_label(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<label::Model, ServiceError> {
    owned_label(db, user_id, id).await
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_label(db: &DatabaseConnection, user_id: i32, input: NewLabel) -> Result<label::Model, ServiceError> {
    let color = input.color.as_deref().unwrap_or(DEFAULT_COLOR);
    let created = label::create(db, user_id, &input.name, color, input.is_column).await?;
    info!(label_id = created.id, user_id, "label_created");
    Ok(created)
}

#[instrument(skip(db, patch))]
pub async fn update_label(db: &DatabaseConnection, user_id: i32, id: i32, patch: LabelPatch) -> Result<label::Model, ServiceError> {
    let existing = owned_label(db, user_id, id).await?;
    Ok(label::apply_changes(db, existing, patch.into()).await?)
}

/// Removes the label from every task it was attached to.
#[instrument(skip(db))]
pub async fn delete_label(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<(), ServiceError> {
    let existing = owned_label(db, user_id, id).await?;
    existing.delete(db).await?;
    info!(label_id = id, user_id, "label_deleted");
    Ok(())
}

/// Tasks carrying a label, in the same order as the task list.
pub async fn label_tasks(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<Vec<TaskWithLabels>, ServiceError> {
    let label = owned_label(db, user_id, id).await?;
    let tasks = label
        .find_related(task::Entity)
        .filter(task::Column::UserId.eq(user_id))
        .order_by_with_nulls(task::Column::DueDate, Order::Asc, NullOrdering::Last)
        .order_by_asc(task::Column::Id)
        .all(db)
        .await?;
    task_service::attach_labels(db, tasks).await
}
