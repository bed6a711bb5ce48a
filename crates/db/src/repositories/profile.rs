//! Profile repository.

use std::sync::Arc;

use crate::entities::{profile, Profile};
use linkup_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a profile by ID, failing if it does not exist.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
    }

    /// Find a profile by the external identity subject.
    pub async fn find_by_subject(&self, subject: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Subject.eq(subject))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by handle.
    pub async fn find_by_handle(&self, handle: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Handle.eq(handle))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment followers count atomically (single UPDATE query, no fetch).
    pub async fn increment_followers_count(&self, profile_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowersCount,
                Expr::col(profile::Column::FollowersCount).add(1),
            )
            .filter(profile::Column::Id.eq(profile_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement followers count atomically, clamped at zero.
    pub async fn decrement_followers_count(&self, profile_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowersCount,
                Expr::cust("GREATEST(followers_count - 1, 0)"),
            )
            .filter(profile::Column::Id.eq(profile_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment following count atomically.
    pub async fn increment_following_count(&self, profile_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowingCount,
                Expr::col(profile::Column::FollowingCount).add(1),
            )
            .filter(profile::Column::Id.eq(profile_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement following count atomically, clamped at zero.
    pub async fn decrement_following_count(&self, profile_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowingCount,
                Expr::cust("GREATEST(following_count - 1, 0)"),
            )
            .filter(profile::Column::Id.eq(profile_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_profile(id: &str, subject: &str, handle: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            subject: subject.to_string(),
            handle: handle.to_string(),
            display_name: None,
            avatar_url: None,
            bio: None,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_subject_found() {
        let profile = create_test_profile("p1", "auth0|123", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_subject("auth0|123").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().handle, "alice");
    }

    #[tokio::test]
    async fn test_find_by_subject_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_subject("auth0|missing").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_profile_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.get_by_id("p404").await;

        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
    }
}
