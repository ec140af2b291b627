use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};

use models::task::{TaskChanges, TaskFields};
use models::{label, task, task_label};

use crate::errors::ServiceError;

/// Date-range / completion filter for task listings. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub is_done: Option<bool>,
}

impl TaskFilter {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ServiceError::Validation("start must not be after end".into()));
            }
        }
        Ok(())
    }
}

/// A task with the ids of its labels, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskWithLabels {
    #[serde(flatten)]
    pub task: task::Model,
    pub labels: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_done: Option<bool>,
    #[serde(default)]
    pub label_ids: Option<Vec<i32>>,
}

/// Partial update; an explicit `"due_date": null` clears the date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<FixedOffset>>>,
    #[serde(default)]
    pub is_done: Option<bool>,
}

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<TaskPatch> for TaskChanges {
    fn from(p: TaskPatch) -> Self {
        TaskChanges { title: p.title, description: p.description, due_date: p.due_date, is_done: p.is_done }
    }
}

pub(crate) async fn attach_labels<C: sea_orm::ConnectionTrait>(db: &C, tasks: Vec<task::Model>) -> Result<Vec<TaskWithLabels>, ServiceError> {
    let ids: Vec<i32> = tasks.iter().map(|t| t.id).collect();
    let mut by_task = task_label::label_ids_by_task(db, &ids).await?;
    Ok(tasks
        .into_iter()
        .map(|task| {
            let labels = by_task.remove(&task.id).unwrap_or_default();
            TaskWithLabels { task, labels }
        })
        .collect())
}

async fn owned_task<C: sea_orm::ConnectionTrait>(db: &C, user_id: i32, id: i32) -> Result<task::Model, ServiceError> {
    task::find_owned(db, user_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("task"))
}

/// All of `label_ids` must belong to `user_id`. Returns the de-duplicated set.
async fn owned_label_set<C: sea_orm::ConnectionTrait>(db: &C, user_id: i32, label_ids: &[i32]) -> Result<BTreeSet<i32>, ServiceError> {
    let wanted: BTreeSet<i32> = label_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(wanted);
    }
    let found: BTreeSet<i32> = label::Entity::find()
        .filter(label::Column::UserId.eq(user_id))
        .filter(label::Column::Id.is_in(wanted.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();
    if let Some(missing) = wanted.difference(&found).next() {
        return Err(ServiceError::Validation(format!("unknown label id {missing}")));
    }
    Ok(wanted)
}

/// List a user's tasks, earliest due first (undated last).
#[instrument(skip(db))]
pub async fn list_tasks(db: &DatabaseConnection, user_id: i32, filter: &TaskFilter) -> Result<Vec<TaskWithLabels>, ServiceError> {
    filter.validate()?;
    let mut query = task::Entity::find().filter(task::Column::UserId.eq(user_id));
    if let Some(start) = filter.start {
        query = query.filter(task::Column::DueDate.gte(start));
    }
    if let Some(end) = filter.end {
        query = query.filter(task::Column::DueDate.lte(end));
    }
    if let Some(is_done) = filter.is_done {
        query = query.filter(task::Column::IsDone.eq(is_done));
    }
    let tasks = query
        .order_by_with_nulls(task::Column::DueDate, Order::Asc, NullOrdering::Last)
        .order_by_asc(task::Column::Id)
        .all(db)
        .await?;
    attach_labels(db, tasks).await
}

pub async fn get_task(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<TaskWithLabels, ServiceError> {
    let task = owned_task(db, user_id, id).await?;
    let mut out = attach_labels(db, vec![task]).await?;
    out.pop().ok_or_else(|| ServiceError::not_found("task"))
}

/// Create a task, optionally attaching labels, in one transaction.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_task(db: &DatabaseConnection, user_id: i32, input: NewTask) -> Result<TaskWithLabels, ServiceError> {
    let txn = db.begin().await?;
    let labels = owned_label_set(&txn, user_id, input.label_ids.as_deref().unwrap_or_default()).await?;
    let fields = TaskFields {
        title: input.title,
        description: input.description.unwrap_or_default(),
        due_date: input.due_date,
        is_done: input.is_done.unwrap_or(false),
    };
    let created = task::create(&txn, user_id, fields).await?;
    task_label::replace_for_task(&txn, created.id, &labels).await?;
    txn.commit().await?;
    info!(task_id = created.id, user_id, "task_created");
    Ok(TaskWithLabels { task: created, labels: labels.into_iter().collect() })
}

#[instrument(skip(db, patch))]
pub async fn update_task(db: &DatabaseConnection, user_id: i32, id: i32, patch: TaskPatch) -> Result<TaskWithLabels, ServiceError> {
    let existing = owned_task(db, user_id, id).await?;
    let updated = task::apply_changes(db, existing, patch.into()).await?;
    let mut out = attach_labels(db, vec![updated]).await?;
    out.pop().ok_or_else(|| ServiceError::not_found("task"))
}

#[instrument(skip(db))]
pub async fn delete_task(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<(), ServiceError> {
    let existing = owned_task(db, user_id, id).await?;
    existing.delete(db).await?;
    info!(task_id = id, user_id, "task_deleted");
    Ok(())
}

/// Labels of a task, ordered by name.
pub async fn task_labels(db: &DatabaseConnection, user_id: i32, id: i32) -> Result<Vec<label::Model>, ServiceError> {
    let task = owned_task(db, user_id, id).await?;
    Ok(task
        .find_related(label::Entity)
        .order_by_asc(label::Column::Name)
        .order_by_asc(label::Column::Id)
        .all(db)
        .await?)
}

/// Replace the label set of a task. Unknown or foreign label ids abort the whole change.
#[instrument(skip(db))]
pub async fn set_task_labels(db: &DatabaseConnection, user_id: i32, id: i32, label_ids: Vec<i32>) -> Result<Vec<label::Model>, ServiceError> {
    let txn = db.begin().await?;
    owned_task(&txn, user_id, id).await?;
    let labels = owned_label_set(&txn, user_id, &label_ids).await?;
    task_label::replace_for_task(&txn, id, &labels).await?;
    txn.commit().await?;
    info!(task_id = id, count = labels.len(), "task_labels_replaced");
    task_labels(db, user_id, id).await
}
