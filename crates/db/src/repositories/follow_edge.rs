//! Follow edge repository.

use std::sync::Arc;

use crate::entities::{follow_edge, FollowEdge};
use linkup_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Follow edge repository for database operations.
#[derive(Clone)]
pub struct FollowEdgeRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowEdgeRepository {
    /// Create a new follow edge repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an edge by follower and followee.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<follow_edge::Model>> {
        FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(follower_id))
            .filter(follow_edge::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a profile is following another profile.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followee_id).await?.is_some())
    }

    /// Create a new follow edge.
    pub async fn create(&self, model: follow_edge::ActiveModel) -> AppResult<follow_edge::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an edge by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let edge = self.find_by_pair(follower_id, followee_id).await?;
        if let Some(e) = edge {
            e.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Get profiles that a profile is following (paginated).
    pub async fn find_following(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        let mut query = FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(profile_id))
            .order_by_desc(follow_edge::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_edge::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get profiles that are following a profile (paginated).
    pub async fn find_followers(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        let mut query = FollowEdge::find()
            .filter(follow_edge::Column::FolloweeId.eq(profile_id))
            .order_by_desc(follow_edge::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_edge::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All followee IDs for a profile (for feed assembly).
    pub async fn find_followee_ids(&self, profile_id: &str) -> AppResult<Vec<String>> {
        let edges = FollowEdge::find()
            .filter(follow_edge::Column::FollowerId.eq(profile_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.into_iter().map(|e| e.followee_id).collect())
    }

}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_edge(id: &str, follower_id: &str, followee_id: &str) -> follow_edge::Model {
        follow_edge::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_following_true() {
        let edge = create_test_edge("e1", "p1", "p2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge.clone()]])
                .into_connection(),
        );

        let repo = FollowEdgeRepository::new(db);
        let result = repo.is_following("p1", "p2").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_is_following_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow_edge::Model>::new()])
                .into_connection(),
        );

        let repo = FollowEdgeRepository::new(db);
        let result = repo.is_following("p1", "p3").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_find_followee_ids() {
        let e1 = create_test_edge("e1", "p1", "p2");
        let e2 = create_test_edge("e2", "p1", "p3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1, e2]])
                .into_connection(),
        );

        let repo = FollowEdgeRepository::new(db);
        let result = repo.find_followee_ids("p1").await.unwrap();

        assert_eq!(result, vec!["p2".to_string(), "p3".to_string()]);
    }

    #[tokio::test]
    async fn test_find_followers() {
        let e1 = create_test_edge("e1", "p2", "p1");
        let e2 = create_test_edge("e2", "p3", "p1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1, e2]])
                .into_connection(),
        );

        let repo = FollowEdgeRepository::new(db);
        let result = repo.find_followers("p1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
