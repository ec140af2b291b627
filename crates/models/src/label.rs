use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{task, task_label, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "label")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub color: String,
    pub is_column: bool,
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

impl Related<task::Entity> for Entity {
    fn to() -> RelationDef { task_label::Relation::Task.def() }

    fn via() -> Option<RelationDef> { Some(task_label::Relation::Label.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub const DEFAULT_COLOR: &str = "#888888";

pub fn validate_name(name: &str) -> Result<String, ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation("label name required".into()));
    }
    if trimmed.chars().count() > 64 {
        return Err(ModelError::Validation("label name too long (<=64)".into()));
    }
    Ok(trimmed.to_string())
}

/// Accepts `#rrggbb` and returns it lower-cased.
pub fn validate_color(color: &str) -> Result<String, ModelError> {
    let c = color.trim();
    let hex = c
        .strip_prefix('#')
        .ok_or_else(|| ModelError::Validation("color must look like #rrggbb".into()))?;
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ModelError::Validation("color must look like #rrggbb".into()));
    }
    Ok(c.to_ascii_lowercase())
}

/// Perceived brightness (0..=255) of a validated `#rrggbb` colour.
pub fn brightness(color: &str) -> u8 {
    let channel = |i: usize| u8::from_str_radix(color.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0) as u32;
    let (r, g, b) = (channel(1), channel(3), channel(5));
    ((r * 299 + g * 587 + b * 114) / 1000) as u8
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
    color: &str,
    is_column: bool,
) -> Result<Model, ModelError> {
    let name = validate_name(name)?;
    let color = validate_color(color)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        name: Set(name),
        color: Set(color),
        is_column: Set(is_column),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

#[derive(Clone, Debug, Default)]
pub struct LabelChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub is_column: Option<bool>,
}

pub async fn apply_changes<C: ConnectionTrait>(db: &C, existing: Model, changes: LabelChanges) -> Result<Model, ModelError> {
    if changes.name.is_none() && changes.color.is_none() && changes.is_column.is_none() {
        return Ok(existing);
    }
    let mut am: ActiveModel = existing.into();
    if let Some(name) = changes.name {
        am.name = Set(validate_name(&name)?);
    }
    if let Some(color) = changes.color {
        am.color = Set(validate_color(&color)?);
    }
    if let Some(is_column) = changes.is_column {
        am.is_column = Set(is_column);
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
