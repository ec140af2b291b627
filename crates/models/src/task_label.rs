use std::collections::{BTreeMap, BTreeSet};

use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{label, task};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_label")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub task_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub label_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Task,
    Label,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Task => Entity::belongs_to(task::Entity)
                .from(Column::TaskId)
                .to(task::Column::Id)
                .into(),
            Relation::Label => Entity::belongs_to(label::Entity)
                .from(Column::LabelId)
                .to(label::Column::Id)
                .into(),
        }
    }
}

impl Related<task::Entity> for Entity {
    fn to() -> RelationDef { Relation::Task.def() }
}

impl Related<label::Entity> for Entity {
    fn to() -> RelationDef { Relation::Label.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Label ids per task for the given tasks; tasks without labels map to an empty list.
pub async fn label_ids_by_task<C: ConnectionTrait>(db: &C, task_ids: &[i32]) -> Result<BTreeMap<i32, Vec<i32>>, ModelError> {
    let mut out: BTreeMap<i32, Vec<i32>> = task_ids.iter().map(|id| (*id, Vec::new())).collect();
    if task_ids.is_empty() {
        return Ok(out);
    }
    let rows = Entity::find()
        .filter(Column::TaskId.is_in(task_ids.iter().copied()))
        .order_by_asc(Column::TaskId)
        .order_by_asc(Column::LabelId)
        .all(db)
        .await?;
    for row in rows {
        out.entry(row.task_id).or_default().push(row.label_id);
    }
    Ok(out)
}

/// Replace the label set of a task. Callers check ownership of every label id.
pub async fn replace_for_task<C: ConnectionTrait>(db: &C, task_id: i32, label_ids: &BTreeSet<i32>) -> Result<(), ModelError> {
    Entity::delete_many()
        .filter(Column::TaskId.eq(task_id))
        .exec(db)
        .await?;
    if label_ids.is_empty() {
        return Ok(());
    }
    let rows = label_ids.iter().map(|label_id| ActiveModel {
        task_id: Set(task_id),
        label_id: Set(*label_id),
    });
    Entity::insert_many(rows).exec(db).await?;
    Ok(())
}
