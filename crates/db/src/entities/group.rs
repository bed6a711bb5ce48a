//! Group entity for multi-party channels.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named multi-party channel with a creator.
///
/// Invariant: every group has at least one admin at all times; the first
/// member is always the creator with the admin role.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Profile that created the group.
    #[sea_orm(indexed)]
    pub creator_id: String,

    /// Group name.
    pub name: String,

    /// Group description (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Number of members (denormalized).
    #[sea_orm(default_value = 1)]
    pub members_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::CreatorId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(has_many = "super::group_member::Entity")]
    Members,

    #[sea_orm(has_many = "super::group_message::Entity")]
    Messages,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::group_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
