//! Follow request repository.

use std::sync::Arc;

use crate::entities::follow_request::{self, RequestStatus};
use crate::entities::FollowRequest;
use linkup_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Follow request repository for database operations.
#[derive(Clone)]
pub struct FollowRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRequestRepository {
    /// Create a new follow request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow request by sender and receiver. At most one row can
    /// exist per ordered pair.
    pub async fn find_by_pair(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> AppResult<Option<follow_request::Model>> {
        FollowRequest::find()
            .filter(follow_request::Column::SenderId.eq(sender_id))
            .filter(follow_request::Column::ReceiverId.eq(receiver_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new follow request.
    pub async fn create(
        &self,
        model: follow_request::ActiveModel,
    ) -> AppResult<follow_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a follow request (status transition).
    pub async fn update(
        &self,
        model: follow_request::ActiveModel,
    ) -> AppResult<follow_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a follow request by pair.
    pub async fn delete_by_pair(&self, sender_id: &str, receiver_id: &str) -> AppResult<()> {
        let request = self.find_by_pair(sender_id, receiver_id).await?;
        if let Some(r) = request {
            r.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get pending follow requests received by a profile (paginated).
    pub async fn find_received_pending(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        let mut query = FollowRequest::find()
            .filter(follow_request::Column::ReceiverId.eq(profile_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(follow_request::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_request::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get follow requests sent by a profile (paginated).
    pub async fn find_sent(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        let mut query = FollowRequest::find()
            .filter(follow_request::Column::SenderId.eq(profile_id))
            .order_by_desc(follow_request::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_request::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending follow requests received by a profile.
    pub async fn count_received_pending(&self, profile_id: &str) -> AppResult<u64> {
        FollowRequest::find()
            .filter(follow_request::Column::ReceiverId.eq(profile_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
