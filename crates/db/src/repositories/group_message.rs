//! Group message repository.

use std::sync::Arc;

use crate::entities::{group_message, GroupMessage};
use chrono::{DateTime, FixedOffset};
use linkup_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Repository for group message operations.
#[derive(Clone)]
pub struct GroupMessageRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupMessageRepository {
    /// Create a new group message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new group message.
    pub async fn create(
        &self,
        model: group_message::ActiveModel,
    ) -> AppResult<group_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find messages in a group, newest first (paginated).
    pub async fn find_by_group(
        &self,
        group_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<group_message::Model>> {
        let mut query = GroupMessage::find()
            .filter(group_message::Column::GroupId.eq(group_id))
            .order_by_desc(group_message::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(group_message::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count messages in a group newer than the given instant, not sent by
    /// the given profile (unread derivation).
    pub async fn count_unread(
        &self,
        group_id: &str,
        reader_id: &str,
        after: Option<DateTime<FixedOffset>>,
    ) -> AppResult<u64> {
        let mut query = GroupMessage::find()
            .filter(group_message::Column::GroupId.eq(group_id))
            .filter(group_message::Column::SenderId.ne(reader_id));

        if let Some(after) = after {
            query = query.filter(group_message::Column::CreatedAt.gt(after));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
