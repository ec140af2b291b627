use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Task: date-range listing per user
        manager
            .create_index(
                Index::create()
                    .name("idx_task_user_due_date")
                    .table(Task::Table)
                    .col(Task::UserId)
                    .col(Task::DueDate)
                    .to_owned(),
            )
            .await?;

        // Label: index on user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_label_user")
                    .table(Label::Table)
                    .col(Label::UserId)
                    .to_owned(),
            )
            .await?;

        // TaskLabel: reverse lookup (tasks of a label); the PK already covers task_id
        manager
            .create_index(
                Index::create()
                    .name("idx_task_label_label")
                    .table(TaskLabel::Table)
                    .col(TaskLabel::LabelId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_task_user_due_date").table(Task::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_label_user").table(Label::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_task_label_label").table(TaskLabel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Task { Table, UserId, DueDate }

#[derive(DeriveIden)]
enum Label { Table, UserId }

#[derive(DeriveIden)]
enum TaskLabel { Table, LabelId }
