//! Create `task_label` join table (many-to-many between `task` and `label`).
//!
//! Rows disappear with either side via cascading FKs.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskLabel::Table)
                    .if_not_exists()
                    .col(integer(TaskLabel::TaskId).not_null())
                    .col(integer(TaskLabel::LabelId).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_task_label")
                            .col(TaskLabel::TaskId)
                            .col(TaskLabel::LabelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_label_task")
                            .from(TaskLabel::Table, TaskLabel::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_label_label")
                            .from(TaskLabel::Table, TaskLabel::LabelId)
                            .to(Label::Table, Label::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TaskLabel::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TaskLabel { Table, TaskId, LabelId }

#[derive(DeriveIden)]
enum Task { Table, Id }

#[derive(DeriveIden)]
enum Label { Table, Id }
