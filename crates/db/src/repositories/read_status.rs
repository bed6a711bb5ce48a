//! Read status repository.

use std::sync::Arc;

use crate::entities::{read_status, ReadStatus};
use linkup_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

/// Read status repository for database operations.
#[derive(Clone)]
pub struct ReadStatusRepository {
    db: Arc<DatabaseConnection>,
}

impl ReadStatusRepository {
    /// Create a new read status repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the marker for a (profile, conversation) pair.
    pub async fn find_for_conversation(
        &self,
        profile_id: &str,
        conversation_id: &str,
    ) -> AppResult<Option<read_status::Model>> {
        ReadStatus::find()
            .filter(read_status::Column::ProfileId.eq(profile_id))
            .filter(read_status::Column::ConversationId.eq(conversation_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the marker for a (profile, group) pair.
    pub async fn find_for_group(
        &self,
        profile_id: &str,
        group_id: &str,
    ) -> AppResult<Option<read_status::Model>> {
        ReadStatus::find()
            .filter(read_status::Column::ProfileId.eq(profile_id))
            .filter(read_status::Column::GroupId.eq(group_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new marker.
    pub async fn create(&self, model: read_status::ActiveModel) -> AppResult<read_status::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing marker.
    pub async fn update(&self, model: read_status::ActiveModel) -> AppResult<read_status::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
