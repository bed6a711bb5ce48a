//! Follow request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a follow request.
///
/// `pending → accepted` and `pending → rejected` are terminal; the only
/// way back to `pending` is deleting the row and requesting again.
/// Rejected rows are retained so "asked and declined" stays
/// distinguishable from "never asked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RequestStatus {
    /// Waiting for the receiver to respond.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the receiver; the follow edge has been materialized.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Declined by the receiver; the row is retained.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Unique per ordered (sender, receiver) pair; self-loops forbidden.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The profile that asked to follow.
    #[sea_orm(indexed)]
    pub sender_id: String,

    /// The profile being asked.
    #[sea_orm(indexed)]
    pub receiver_id: String,

    pub status: RequestStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::SenderId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ReceiverId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
