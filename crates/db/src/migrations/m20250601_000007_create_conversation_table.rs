//! Create conversation table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conversation::ParticipantOneId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversation::ParticipantTwoId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Conversation::LastMessageAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_participant_one")
                            .from(Conversation::Table, Conversation::ParticipantOneId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_participant_two")
                            .from(Conversation::Table, Conversation::ParticipantTwoId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (participant_one_id, participant_two_id) - with the
        // slots canonically ordered this admits one row per unordered pair
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_participants")
                    .table(Conversation::Table)
                    .col(Conversation::ParticipantOneId)
                    .col(Conversation::ParticipantTwoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: last_message_at (recency-ordered conversation lists)
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_last_message_at")
                    .table(Conversation::Table)
                    .col(Conversation::LastMessageAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conversation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Conversation {
    Table,
    Id,
    ParticipantOneId,
    ParticipantTwoId,
    CreatedAt,
    LastMessageAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
