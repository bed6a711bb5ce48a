//! Read status entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Last-read marker per (profile, conversation) or (profile, group).
///
/// Exactly one of `conversation_id` / `group_id` is set; the service layer
/// enforces this when upserting. Unread counts derive from messages newer
/// than `last_read_at`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "read_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The reading profile.
    #[sea_orm(indexed)]
    pub profile_id: String,

    /// Target conversation (for direct threads).
    #[sea_orm(nullable, indexed)]
    pub conversation_id: Option<String>,

    /// Target group (for group channels).
    #[sea_orm(nullable, indexed)]
    pub group_id: Option<String>,

    /// Creation time of the newest message the profile has seen.
    pub last_read_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,

    #[sea_orm(
        belongs_to = "super::conversation::Entity",
        from = "Column::ConversationId",
        to = "super::conversation::Column::Id",
        on_delete = "Cascade"
    )]
    Conversation,

    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
}

impl ActiveModelBehavior for ActiveModel {}
