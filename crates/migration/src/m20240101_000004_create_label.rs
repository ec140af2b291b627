//! Create `label` table with FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Label::Table)
                    .if_not_exists()
                    .col(pk_auto(Label::Id))
                    .col(integer(Label::UserId).not_null())
                    .col(string_len(Label::Name, 64).not_null())
                    .col(string_len(Label::Color, 7).not_null())
                    .col(boolean(Label::IsColumn).not_null().default(false))
                    .col(timestamp_with_time_zone(Label::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Label::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_label_user")
                            .from(Label::Table, Label::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Label::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Label { Table, Id, UserId, Name, Color, IsColumn, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
