use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{label, task_label, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub is_done: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    TaskLabel,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::TaskLabel => Entity::has_many(task_label::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<task_label::Entity> for Entity {
    fn to() -> RelationDef { Relation::TaskLabel.def() }
}

impl Related<label::Entity> for Entity {
    fn to() -> RelationDef { task_label::Relation::Label.def() }

    fn via() -> Option<RelationDef> { Some(task_label::Relation::Task.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub const TITLE_MAX_CHARS: usize = 255;

/// Returns the trimmed title.
pub fn validate_title(title: &str) -> Result<String, ModelError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation("title required".into()));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(ModelError::Validation(format!("title too long (<={TITLE_MAX_CHARS})")));
    }
    Ok(trimmed.to_string())
}

/// Fields of a task as supplied by its owner.
#[derive(Clone, Debug, Default)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub is_done: bool,
}

pub async fn create<C: ConnectionTrait>(db: &C, user_id: i32, fields: TaskFields) -> Result<Model, ModelError> {
    let title = validate_title(&fields.title)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        title: Set(title),
        description: Set(fields.description),
        due_date: Set(fields.due_date),
        is_done: Set(fields.is_done),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// Partial update. `due_date: Some(None)` clears the date.
#[derive(Clone, Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<DateTimeWithTimeZone>>,
    pub is_done: Option<bool>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.due_date.is_none() && self.is_done.is_none()
    }
}

pub async fn apply_changes<C: ConnectionTrait>(db: &C, existing: Model, changes: TaskChanges) -> Result<Model, ModelError> {
    if changes.is_empty() {
        return Ok(existing);
    }
    let mut am: ActiveModel = existing.into();
    if let Some(title) = changes.title {
        am.title = Set(validate_title(&title)?);
    }
    if let Some(description) = changes.description {
        am.description = Set(description);
    }
    if let Some(due_date) = changes.due_date {
        am.due_date = Set(due_date);
    }
    if let Some(is_done) = changes.is_done {
        am.is_done = Set(is_done);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, user_id: i32, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?)
}
