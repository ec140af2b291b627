use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use models::user;

use crate::errors::ServiceError;

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(first) = &self.first_name {
            user::validate_name("first_name", first)?;
        }
        if let Some(last) = &self.last_name {
            user::validate_name("last_name", last)?;
        }
        Ok(())
    }
}

pub async fn get_profile(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))
}

#[instrument(skip(db, patch))]
pub async fn update_profile(db: &DatabaseConnection, user_id: i32, patch: ProfilePatch) -> Result<user::Model, ServiceError> {
    patch.validate()?;
    let existing = get_profile(db, user_id).await?;
    if patch.first_name.is_none() && patch.last_name.is_none() {
        return Ok(existing);
    }
    let mut am: user::ActiveModel = existing.into();
    if let Some(first) = patch.first_name {
        am.first_name = Set(first.trim().to_string());
    }
    if let Some(last) = patch.last_name {
        am.last_name = Set(last.trim().to_string());
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Deletes the account together with everything it owns.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i32) -> Result<(), ServiceError> {
    if !user::hard_delete(db, user_id).await? {
        return Err(ServiceError::not_found("user"));
    }
    info!(user_id, "user_deleted");
    Ok(())
}
