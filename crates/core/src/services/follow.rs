//! Follow service.
//!
//! The ledger of directed follow relationships. Follow edges are never
//! written by callers directly: the only path that materializes an edge is
//! a follow request transitioning to accepted, so an edge always implies a
//! completed request workflow.

use crate::services::event_publisher::EventPublisherService;
use chrono::Utc;
use linkup_common::{AppError, AppResult, IdGenerator};
use linkup_db::{
    entities::follow_request::{self, RequestStatus},
    entities::follow_edge,
    repositories::{FollowEdgeRepository, FollowRequestRepository, ProfileRepository},
};
use sea_orm::Set;

/// Relation between two profiles, as seen from the first one.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationState {
    pub following: bool,
    pub followed_by: bool,
    pub mutual: bool,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_request_repo: FollowRequestRepository,
    follow_edge_repo: FollowEdgeRepository,
    profile_repo: ProfileRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(
        follow_request_repo: FollowRequestRepository,
        follow_edge_repo: FollowEdgeRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        Self {
            follow_request_repo,
            follow_edge_repo,
            profile_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Send (or re-send) a follow request.
    ///
    /// Upsert semantics keep at most one row per ordered pair: a pending or
    /// accepted request is returned unchanged, a rejected one is reset to
    /// pending. A uniqueness conflict from a concurrent identical request
    /// resolves the same way on the caller's retry.
    pub async fn request_follow(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> AppResult<follow_request::Model> {
        if sender_id == receiver_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        // Receiver must exist; a dangling reference is a bad request, not
        // a retry case.
        self.profile_repo.get_by_id(receiver_id).await?;

        if let Some(existing) = self
            .follow_request_repo
            .find_by_pair(sender_id, receiver_id)
            .await?
        {
            return match existing.status {
                RequestStatus::Pending | RequestStatus::Accepted => Ok(existing),
                RequestStatus::Rejected => {
                    let mut active: follow_request::ActiveModel = existing.into();
                    active.status = Set(RequestStatus::Pending);
                    active.updated_at = Set(Some(Utc::now().into()));
                    self.follow_request_repo.update(active).await
                }
            };
        }

        if self
            .follow_edge_repo
            .is_following(sender_id, receiver_id)
            .await?
        {
            return Err(AppError::BadRequest("Already following".to_string()));
        }

        let model = follow_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            sender_id: Set(sender_id.to_string()),
            receiver_id: Set(receiver_id.to_string()),
            status: Set(RequestStatus::Pending),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.follow_request_repo.create(model).await
    }

    /// Accept a pending follow request. Only the receiver may call this.
    ///
    /// Accepting materializes the follow edge; accepting twice produces
    /// exactly one edge.
    pub async fn accept_request(&self, receiver_id: &str, sender_id: &str) -> AppResult<()> {
        let request = self
            .follow_request_repo
            .find_by_pair(sender_id, receiver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Follow request not found".to_string()))?;

        match request.status {
            RequestStatus::Accepted => {
                // Replaying the accept only has to guarantee the edge.
                self.materialize_edge(sender_id, receiver_id).await?;
                return Ok(());
            }
            RequestStatus::Rejected => {
                return Err(AppError::BadRequest(
                    "Follow request was already rejected".to_string(),
                ));
            }
            RequestStatus::Pending => {}
        }

        let mut active: follow_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Accepted);
        active.updated_at = Set(Some(Utc::now().into()));
        self.follow_request_repo.update(active).await?;

        self.materialize_edge(sender_id, receiver_id).await?;

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish_followed(sender_id, receiver_id)
                .await
        {
            tracing::warn!(error = %e, "Failed to publish followed event");
        }

        Ok(())
    }

    /// Create the follow edge for an accepted request if it does not exist
    /// yet. Counters move only when a row is actually inserted.
    async fn materialize_edge(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if self
            .follow_edge_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Ok(());
        }

        let model = follow_edge::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.follow_edge_repo.create(model).await?;

        self.profile_repo
            .increment_following_count(follower_id)
            .await?;
        self.profile_repo
            .increment_followers_count(followee_id)
            .await?;

        Ok(())
    }

    /// Reject a pending follow request. Only the receiver may call this.
    /// The row is retained with rejected status, so "asked and declined"
    /// stays distinguishable from "never asked".
    pub async fn reject_request(&self, receiver_id: &str, sender_id: &str) -> AppResult<()> {
        let request = self
            .follow_request_repo
            .find_by_pair(sender_id, receiver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Follow request not found".to_string()))?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::BadRequest(
                "Follow request is not pending".to_string(),
            ));
        }

        let mut active: follow_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Rejected);
        active.updated_at = Set(Some(Utc::now().into()));
        self.follow_request_repo.update(active).await?;

        Ok(())
    }

    /// Delete a request as its receiver, in any status (reject-by-delete).
    /// Clears the pair so a fresh request can be sent later.
    pub async fn withdraw_request(&self, receiver_id: &str, sender_id: &str) -> AppResult<()> {
        self.follow_request_repo
            .delete_by_pair(sender_id, receiver_id)
            .await
    }

    /// Cancel a follow request as its sender, only while pending.
    pub async fn cancel_request(&self, sender_id: &str, receiver_id: &str) -> AppResult<()> {
        let request = self
            .follow_request_repo
            .find_by_pair(sender_id, receiver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Follow request not found".to_string()))?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending requests can be cancelled".to_string(),
            ));
        }

        self.follow_request_repo
            .delete_by_pair(sender_id, receiver_id)
            .await
    }

    /// Unfollow a profile.
    ///
    /// Deletes the edge and, as cleanup, any lingering request between the
    /// pair, so a later request does not trip the uniqueness constraint.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        let removed = self
            .follow_edge_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        if !removed {
            return Err(AppError::BadRequest("Not following".to_string()));
        }

        self.profile_repo
            .decrement_following_count(follower_id)
            .await?;
        self.profile_repo
            .decrement_followers_count(followee_id)
            .await?;

        self.follow_request_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish_unfollowed(follower_id, followee_id)
                .await
        {
            tracing::warn!(error = %e, "Failed to publish unfollowed event");
        }

        Ok(())
    }

    /// Check if a profile is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_edge_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Check whether both directed edges exist between two profiles.
    /// Never true from a one-sided edge.
    pub async fn is_mutual(&self, a: &str, b: &str) -> AppResult<bool> {
        Ok(self.follow_edge_repo.is_following(a, b).await?
            && self.follow_edge_repo.is_following(b, a).await?)
    }

    /// Relation between two profiles, as seen from the first.
    pub async fn relation(&self, profile_id: &str, other_id: &str) -> AppResult<RelationState> {
        let following = self.follow_edge_repo.is_following(profile_id, other_id).await?;
        let followed_by = self.follow_edge_repo.is_following(other_id, profile_id).await?;

        Ok(RelationState {
            following,
            followed_by,
            mutual: following && followed_by,
        })
    }

    /// Get followers of a profile.
    pub async fn get_followers(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        self.follow_edge_repo
            .find_followers(profile_id, limit, until_id)
            .await
    }

    /// Get profiles a profile is following.
    pub async fn get_following(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_edge::Model>> {
        self.follow_edge_repo
            .find_following(profile_id, limit, until_id)
            .await
    }

    /// Get pending follow requests received by a profile.
    pub async fn get_pending_requests(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        self.follow_request_repo
            .find_received_pending(profile_id, limit, until_id)
            .await
    }

    /// Get follow requests sent by a profile, in any status.
    pub async fn get_sent_requests(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        self.follow_request_repo
            .find_sent(profile_id, limit, until_id)
            .await
    }

    /// Count pending follow requests received by a profile.
    pub async fn count_pending_requests(&self, profile_id: &str) -> AppResult<u64> {
        self.follow_request_repo
            .count_received_pending(profile_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_edge(id: &str, follower_id: &str, followee_id: &str) -> follow_edge::Model {
        follow_edge::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_request(
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        status: RequestStatus,
    ) -> follow_request::Model {
        follow_request::Model {
            id: id.to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(
        request_db: Arc<sea_orm::DatabaseConnection>,
        edge_db: Arc<sea_orm::DatabaseConnection>,
        profile_db: Arc<sea_orm::DatabaseConnection>,
    ) -> FollowService {
        FollowService::new(
            FollowRequestRepository::new(request_db),
            FollowEdgeRepository::new(edge_db),
            ProfileRepository::new(profile_db),
        )
    }

    #[tokio::test]
    async fn test_request_follow_yourself_returns_error() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db3 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db1, db2, db3);
        let result = service.request_follow("p1", "p1").await;

        assert!(result.is_err());
        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("Cannot follow yourself"));
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_request_follow_pending_is_idempotent() {
        let pending = create_test_request("r1", "p1", "p2", RequestStatus::Pending);
        let receiver = linkup_db::entities::profile::Model {
            id: "p2".to_string(),
            subject: "auth0|p2".to_string(),
            handle: "bob".to_string(),
            display_name: None,
            avatar_url: None,
            bio: None,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending.clone()]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db3 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[receiver]])
                .into_connection(),
        );

        let service = service_with(db1, db2, db3);
        let result = service.request_follow("p1", "p2").await.unwrap();

        // The existing pending row comes back; no second row is created.
        assert_eq!(result.id, "r1");
        assert_eq!(result.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_is_mutual_requires_both_edges() {
        // Only p1 -> p2 exists; the reverse lookup is empty.
        let edge = create_test_edge("e1", "p1", "p2");

        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![edge], Vec::<follow_edge::Model>::new()])
                .into_connection(),
        );
        let db3 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db1, db2, db3);
        let result = service.is_mutual("p1", "p2").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_is_mutual_true_with_both_edges() {
        let e1 = create_test_edge("e1", "p1", "p2");
        let e2 = create_test_edge("e2", "p2", "p1");

        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1], [e2]])
                .into_connection(),
        );
        let db3 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db1, db2, db3);
        let result = service.is_mutual("p1", "p2").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_cancel_request_requires_pending() {
        let accepted = create_test_request("r1", "p1", "p2", RequestStatus::Accepted);

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[accepted]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db3 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db1, db2, db3);
        let result = service.cancel_request("p1", "p2").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_reject_missing_request_is_not_found() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow_request::Model>::new()])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db3 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db1, db2, db3);
        let result = service.reject_request("p2", "p1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_when_not_following_is_error() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow_edge::Model>::new()])
                .into_connection(),
        );
        let db3 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(db1, db2, db3);
        let result = service.unfollow("p1", "p2").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
