//! Create `task` table with FK to `user`.
//!
//! `due_date` is optional; tasks without one never show up in date-filtered lists.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::Id))
                    .col(integer(Task::UserId).not_null())
                    .col(string_len(Task::Title, 255).not_null())
                    .col(text(Task::Description).not_null().default(""))
                    .col(
                        ColumnDef::new(Task::DueDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(boolean(Task::IsDone).not_null().default(false))
                    .col(timestamp_with_time_zone(Task::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Task::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_user")
                            .from(Task::Table, Task::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Task::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Task { Table, Id, UserId, Title, Description, DueDate, IsDone, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
