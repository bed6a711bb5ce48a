//! Post service: feed content, likes, and comments.
//!
//! The denormalized `likes_count` / `comments_count` on a post are a cache
//! of a derivable aggregate. Every path that inserts or deletes a like or
//! comment runs through this service and moves the counter in the same
//! call; no other code writes the counters, so they cannot drift.

use chrono::Utc;
use linkup_common::{AppError, AppResult, IdGenerator};
use linkup_db::{
    entities::{comment, like, post},
    repositories::{
        CommentRepository, FollowEdgeRepository, LikeRepository, PostRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 2048))]
    pub text: String,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    like_repo: LikeRepository,
    comment_repo: CommentRepository,
    follow_edge_repo: FollowEdgeRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        like_repo: LikeRepository,
        comment_repo: CommentRepository,
        follow_edge_repo: FollowEdgeRepository,
    ) -> Self {
        Self {
            post_repo,
            like_repo,
            comment_repo,
            follow_edge_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new post.
    pub async fn create_post(
        &self,
        author_id: &str,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            text: Set(input.text),
            likes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.post_repo.create(model).await
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> AppResult<Option<post::Model>> {
        self.post_repo.find_by_id(id).await
    }

    /// Delete a post. Author only; likes and comments cascade away with it.
    pub async fn delete_post(&self, caller_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != caller_id {
            return Err(AppError::Forbidden(
                "Cannot delete another profile's post".to_string(),
            ));
        }

        self.post_repo.delete(post_id).await
    }

    /// The caller's feed: own posts plus posts of followed profiles,
    /// newest first.
    pub async fn feed(
        &self,
        caller_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut author_ids = self.follow_edge_repo.find_followee_ids(caller_id).await?;
        author_ids.push(caller_id.to_string());

        self.post_repo
            .find_by_authors(&author_ids, limit, until_id)
            .await
    }

    /// Posts authored by a single profile.
    pub async fn posts_by(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_author(author_id, limit, until_id).await
    }

    /// Like a post. A duplicate like is a no-op returning the existing
    /// row; the counter moves only when a row is actually inserted.
    pub async fn like(&self, caller_id: &str, post_id: &str) -> AppResult<like::Model> {
        // Referential check up front, so a dangling post is a clean error.
        self.post_repo.get_by_id(post_id).await?;

        if let Some(existing) = self
            .like_repo
            .find_by_post_and_profile(post_id, caller_id)
            .await?
        {
            return Ok(existing);
        }

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            profile_id: Set(caller_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let like = self.like_repo.create(model).await?;
        self.post_repo.increment_likes_count(post_id).await?;

        Ok(like)
    }

    /// Remove a like. Unliking something never liked is a no-op, so
    /// like-then-unlike round-trips the counter exactly.
    pub async fn unlike(&self, caller_id: &str, post_id: &str) -> AppResult<()> {
        let removed = self
            .like_repo
            .delete_by_post_and_profile(post_id, caller_id)
            .await?;

        if removed {
            self.post_repo.decrement_likes_count(post_id).await?;
        }

        Ok(())
    }

    /// Get likes on a post, newest first.
    pub async fn likes(
        &self,
        post_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<like::Model>> {
        self.like_repo.find_by_post(post_id, limit, until_id).await
    }

    /// Comment on a post.
    pub async fn comment(
        &self,
        author_id: &str,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            author_id: Set(author_id.to_string()),
            text: Set(input.text),
            created_at: Set(Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        self.post_repo.increment_comments_count(post_id).await?;

        Ok(comment)
    }

    /// Delete a comment. Comment author only.
    pub async fn delete_comment(&self, caller_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {comment_id}")))?;

        if comment.author_id != caller_id {
            return Err(AppError::Forbidden(
                "Cannot delete another profile's comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment_id).await?;
        self.post_repo.decrement_comments_count(&comment.post_id).await?;

        Ok(())
    }

    /// Get comments on a post, oldest first.
    pub async fn comments(
        &self,
        post_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_post(post_id, limit, until_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            text: "hello".to_string(),
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_like(id: &str, post_id: &str, profile_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            profile_id: profile_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(
        post_db: Arc<sea_orm::DatabaseConnection>,
        like_db: Arc<sea_orm::DatabaseConnection>,
        comment_db: Arc<sea_orm::DatabaseConnection>,
        edge_db: Arc<sea_orm::DatabaseConnection>,
    ) -> PostService {
        PostService::new(
            PostRepository::new(post_db),
            LikeRepository::new(like_db),
            CommentRepository::new(comment_db),
            FollowEdgeRepository::new(edge_db),
        )
    }

    #[tokio::test]
    async fn test_like_twice_is_noop() {
        let post = create_test_post("post1", "p2");
        let existing = create_test_like("l1", "post1", "p1");

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .into_connection(),
        );
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let edge_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, like_db, comment_db, edge_db);
        let result = service.like("p1", "post1").await.unwrap();

        // The existing row comes back; no insert, no counter movement.
        assert_eq!(result.id, "l1");
    }

    #[tokio::test]
    async fn test_like_missing_post_is_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let like_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let edge_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, like_db, comment_db, edge_db);
        let result = service.like("p1", "ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unlike_never_liked_is_noop() {
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .into_connection(),
        );
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let edge_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, like_db, comment_db, edge_db);
        let result = service.unlike("p1", "post1").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_post_author_only() {
        let post = create_test_post("post1", "p2");

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let like_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let edge_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, like_db, comment_db, edge_db);
        let result = service.delete_post("p1", "post1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_comment_author_only() {
        let comment = comment::Model {
            id: "c1".to_string(),
            post_id: "post1".to_string(),
            author_id: "p2".to_string(),
            text: "nice".to_string(),
            created_at: Utc::now().into(),
        };

        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let like_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );
        let edge_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(post_db, like_db, comment_db, edge_db);
        let result = service.delete_comment("p1", "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
