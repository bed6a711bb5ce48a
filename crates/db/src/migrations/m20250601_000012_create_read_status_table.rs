//! Create read status table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReadStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReadStatus::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReadStatus::ProfileId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReadStatus::ConversationId).string_len(32))
                    .col(ColumnDef::new(ReadStatus::GroupId).string_len(32))
                    .col(
                        ColumnDef::new(ReadStatus::LastReadAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ReadStatus::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_read_status_profile")
                            .from(ReadStatus::Table, ReadStatus::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_read_status_conversation")
                            .from(ReadStatus::Table, ReadStatus::ConversationId)
                            .to(Conversation::Table, Conversation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_read_status_group")
                            .from(ReadStatus::Table, ReadStatus::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (profile_id, conversation_id) - one marker per thread
        manager
            .create_index(
                Index::create()
                    .name("idx_read_status_profile_conversation")
                    .table(ReadStatus::Table)
                    .col(ReadStatus::ProfileId)
                    .col(ReadStatus::ConversationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: (profile_id, group_id) - one marker per group
        manager
            .create_index(
                Index::create()
                    .name("idx_read_status_profile_group")
                    .table(ReadStatus::Table)
                    .col(ReadStatus::ProfileId)
                    .col(ReadStatus::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReadStatus::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReadStatus {
    Table,
    Id,
    ProfileId,
    ConversationId,
    GroupId,
    LastReadAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}

#[derive(Iden)]
enum Conversation {
    Table,
    Id,
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
}
