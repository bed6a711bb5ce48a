//! Profile entity (one per authenticated identity).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Stable identifier supplied by the external identity provider.
    /// Unique and never rewritten after provisioning.
    #[sea_orm(unique, indexed)]
    pub subject: String,

    /// Unique handle chosen at provisioning time.
    #[sea_orm(unique)]
    pub handle: String,

    /// Display name (optional).
    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    /// Avatar reference (optional).
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Bio text (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Number of followers (denormalized).
    #[sea_orm(default_value = 0)]
    pub followers_count: i64,

    /// Number of profiles this profile follows (denormalized).
    #[sea_orm(default_value = 0)]
    pub following_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
