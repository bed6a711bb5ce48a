//! Group member entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum GroupRole {
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
    /// Admin - can manage members.
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Default for GroupRole {
    fn default() -> Self {
        Self::Member
    }
}

impl GroupRole {
    /// Check if the role can manage members.
    #[must_use]
    pub const fn can_manage_members(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Group member - tracks which profiles are in which groups.
/// Unique per (group, profile).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The group they belong to.
    #[sea_orm(indexed)]
    pub group_id: String,

    /// The profile that is a member.
    #[sea_orm(indexed)]
    pub profile_id: String,

    /// Role of the member in the group.
    pub role: GroupRole,

    /// When the profile joined the group.
    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
