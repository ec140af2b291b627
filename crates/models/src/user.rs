use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Task,
    Label,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Task => Entity::has_many(crate::task::Entity).into(),
            Relation::Label => Entity::has_many(crate::label::Entity).into(),
        }
    }
}

impl Related<crate::task::Entity> for Entity {
    fn to() -> RelationDef { Relation::Task.def() }
}

impl Related<crate::label::Entity> for Entity {
    fn to() -> RelationDef { Relation::Label.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(ModelError::Validation("username must be 3-64 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(ModelError::Validation("username may only contain letters, digits, '_', '.', '-'".into()));
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    if value.chars().count() > 128 {
        return Err(ModelError::Validation(format!("{field} too long (<=128)")));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Model, ModelError> {
    validate_username(username)?;
    validate_name("first_name", first_name)?;
    validate_name("last_name", last_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Username.eq(username.to_string()))
        .one(db)
        .await?)
}

/// Deleting a user cascades to credentials, tasks, labels and their associations.
pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("ann").is_ok());
        assert!(validate_username("ann.lee-2_x").is_ok());
        assert!(validate_username("an").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("first_name", "Ann").is_ok());
        assert!(validate_name("first_name", "   ").is_err());
        assert!(validate_name("last_name", &"x".repeat(129)).is_err());
    }
}
