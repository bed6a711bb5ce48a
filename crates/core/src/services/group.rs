//! Group service.
//!
//! Group visibility is membership-gated end to end: non-members see no
//! group, no member list, and no messages (empty results, never errors).
//! All membership checks go through [`GroupAccess`], the trusted read
//! path, never through the member-filtered results this service returns.

use crate::services::event_publisher::EventPublisherService;
use crate::services::group_access::GroupAccess;
use chrono::Utc;
use linkup_common::{AppError, AppResult, IdGenerator};
use linkup_db::entities::group_member::GroupRole;
use linkup_db::entities::{group, group_member, group_message};
use linkup_db::repositories::{GroupMessageRepository, GroupRepository, ProfileRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

/// Service for managing groups.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    group_message_repo: GroupMessageRepository,
    profile_repo: ProfileRepository,
    access: GroupAccess,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(
        group_repo: GroupRepository,
        group_message_repo: GroupMessageRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        let access = GroupAccess::new(group_repo.clone());
        Self {
            group_repo,
            group_message_repo,
            profile_repo,
            access,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// The trusted membership checker backing this service's predicates.
    #[must_use]
    pub const fn access(&self) -> &GroupAccess {
        &self.access
    }

    /// Create a new group.
    ///
    /// The creator's admin membership row is written synchronously with
    /// the group, so a group is never observable without an admin.
    pub async fn create(&self, creator_id: &str, input: CreateGroupInput) -> AppResult<group::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let group_id = self.id_gen.generate();
        let now = Utc::now();

        let model = group::ActiveModel {
            id: Set(group_id.clone()),
            creator_id: Set(creator_id.to_string()),
            name: Set(input.name),
            description: Set(input.description),
            members_count: Set(1), // Creator is the first member
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let group = self.group_repo.create(model).await?;

        self.ensure_creator_membership(&group_id, creator_id).await?;

        Ok(group)
    }

    /// Insert the creator's admin membership if it is not there yet.
    /// Re-running must not error or duplicate.
    async fn ensure_creator_membership(&self, group_id: &str, creator_id: &str) -> AppResult<()> {
        if self.access.is_member(group_id, creator_id).await? {
            return Ok(());
        }

        let model = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            profile_id: Set(creator_id.to_string()),
            role: Set(GroupRole::Admin),
            joined_at: Set(Utc::now().into()),
        };

        // Count stays untouched: the group row starts at 1 for the creator.
        self.group_repo.add_member(model).await?;

        Ok(())
    }

    /// Get a group the caller is a member of. Returns `None` for
    /// non-members, indistinguishable from a missing row.
    pub async fn get(&self, caller_id: &str, group_id: &str) -> AppResult<Option<group::Model>> {
        let Some(group) = self.group_repo.find_by_id(group_id).await? else {
            return Ok(None);
        };

        if !self.access.is_member(group_id, caller_id).await? {
            return Ok(None);
        }

        Ok(Some(group))
    }

    /// List groups the caller is a member of.
    pub async fn list_joined(
        &self,
        caller_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group::Model>> {
        self.group_repo
            .find_joined_by_profile(caller_id, limit, offset)
            .await
    }

    /// List a group's members.
    ///
    /// Members see the full list; everyone else gets an empty one, never
    /// an error and never another member's row.
    pub async fn members(
        &self,
        caller_id: &str,
        group_id: &str,
    ) -> AppResult<Vec<group_member::Model>> {
        if !self.access.is_member(group_id, caller_id).await? {
            return Ok(Vec::new());
        }

        self.group_repo.find_members(group_id).await
    }

    /// Add a member to a group.
    ///
    /// Allowed for group admins, for the declared creator, or into a group
    /// that has no members yet (the creator bootstrap). A duplicate
    /// membership is returned as-is rather than surfacing the conflict.
    pub async fn add_member(
        &self,
        caller_id: &str,
        group_id: &str,
        profile_id: &str,
        role: GroupRole,
    ) -> AppResult<group_member::Model> {
        let group = self.group_repo.get_by_id(group_id).await?;

        // A dangling profile reference is a bad request, not a retry case.
        if self.profile_repo.find_by_id(profile_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "Profile not found: {profile_id}"
            )));
        }

        let authorized = self.access.is_admin(group_id, caller_id).await?
            || !self.access.has_any_members(group_id).await?
            || group.creator_id == caller_id;

        if !authorized {
            return Err(AppError::Forbidden(
                "Only group admins can add members".to_string(),
            ));
        }

        if let Some(existing) = self.access.membership(group_id, profile_id).await? {
            return Ok(existing);
        }

        let model = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            profile_id: Set(profile_id.to_string()),
            role: Set(role),
            joined_at: Set(Utc::now().into()),
        };

        let member = self.group_repo.add_member(model).await?;
        self.group_repo.increment_members_count(group_id).await?;

        Ok(member)
    }

    /// Remove a member (admin action) or leave a group (self removal).
    ///
    /// The last admin can never be removed, so every group keeps at least
    /// one admin at all times.
    pub async fn remove_member(
        &self,
        caller_id: &str,
        group_id: &str,
        profile_id: &str,
    ) -> AppResult<()> {
        if caller_id != profile_id {
            self.access.require_admin(group_id, caller_id).await?;
        }

        let member = self
            .access
            .membership(group_id, profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

        if member.role == GroupRole::Admin && self.group_repo.count_admins(group_id).await? <= 1 {
            return Err(AppError::BadRequest(
                "Cannot remove the last admin of a group".to_string(),
            ));
        }

        if self.group_repo.remove_member(group_id, profile_id).await? {
            self.group_repo.decrement_members_count(group_id).await?;
        }

        Ok(())
    }

    /// Send a message into a group. The sender must be a member at write
    /// time.
    pub async fn send_message(
        &self,
        caller_id: &str,
        group_id: &str,
        text: String,
    ) -> AppResult<group_message::Model> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest("Message must have text".to_string()));
        }

        self.access.require_member(group_id, caller_id).await?;

        let model = group_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            sender_id: Set(caller_id.to_string()),
            text: Set(text),
            created_at: Set(Utc::now().into()),
        };

        let message = self.group_message_repo.create(model).await?;

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish_group_message_created(&message.id, group_id, caller_id)
                .await
        {
            tracing::warn!(error = %e, "Failed to publish group message event");
        }

        Ok(message)
    }

    /// Get messages in a group, newest first.
    ///
    /// Non-members get an empty result set, not an error.
    pub async fn messages(
        &self,
        caller_id: &str,
        group_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<group_message::Model>> {
        if !self.access.is_member(group_id, caller_id).await? {
            return Ok(Vec::new());
        }

        self.group_message_repo
            .find_by_group(group_id, limit, until_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_group(id: &str, creator_id: &str, name: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            creator_id: creator_id.to_string(),
            name: name.to_string(),
            description: None,
            members_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_member(
        id: &str,
        group_id: &str,
        profile_id: &str,
        role: GroupRole,
    ) -> group_member::Model {
        group_member::Model {
            id: id.to_string(),
            group_id: group_id.to_string(),
            profile_id: profile_id.to_string(),
            role,
            joined_at: Utc::now().into(),
        }
    }

    fn create_test_profile(id: &str, handle: &str) -> linkup_db::entities::profile::Model {
        linkup_db::entities::profile::Model {
            id: id.to_string(),
            subject: format!("auth0|{id}"),
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

    fn service_with(
        group_db: Arc<sea_orm::DatabaseConnection>,
        message_db: Arc<sea_orm::DatabaseConnection>,
        profile_db: Arc<sea_orm::DatabaseConnection>,
    ) -> GroupService {
        GroupService::new(
            GroupRepository::new(group_db),
            GroupMessageRepository::new(message_db),
            ProfileRepository::new(profile_db),
        )
    }

    #[tokio::test]
    async fn test_members_empty_for_non_member() {
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(group_db, message_db, profile_db);
        let result = service.members("p3", "g1").await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_members_visible_to_member() {
        let own = create_test_member("m1", "g1", "p1", GroupRole::Member);
        let m1 = create_test_member("m0", "g1", "creator", GroupRole::Admin);
        let m2 = create_test_member("m1", "g1", "p1", GroupRole::Member);

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![own], vec![m1, m2]])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(group_db, message_db, profile_db);
        let result = service.members("p1", "g1").await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_add_member_forbidden_for_plain_member() {
        let group = create_test_group("g1", "creator", "rustaceans");

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // group lookup, admin check (miss), has_any_members count
                .append_query_results([[group]])
                .append_query_results([Vec::<group_member::Model>::new()])
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::from(2i64),
                }]])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("p9", "new")]])
                .into_connection(),
        );

        let service = service_with(group_db, message_db, profile_db);
        let result = service
            .add_member("p1", "g1", "p9", GroupRole::Member)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_member_rejects_unknown_profile() {
        let group = create_test_group("g1", "creator", "rustaceans");

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group]])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<linkup_db::entities::profile::Model>::new()])
                .into_connection(),
        );

        let service = service_with(group_db, message_db, profile_db);
        let result = service
            .add_member("creator", "g1", "ghost", GroupRole::Member)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_remove_last_admin_is_refused() {
        let admin = create_test_member("m1", "g1", "p1", GroupRole::Admin);

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // self-leave: membership lookup, then admin count
                .append_query_results([[admin]])
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::from(1i64),
                }]])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(group_db, message_db, profile_db);
        let result = service.remove_member("p1", "g1", "p1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_send_message_rejects_non_member() {
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(group_db, message_db, profile_db);
        let result = service.send_message("p3", "g1", "hi".to_string()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_messages_empty_for_non_member() {
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(group_db, message_db, profile_db);
        let result = service.messages("p3", "g1", 10, None).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_get_hides_group_from_non_member() {
        let group = create_test_group("g1", "creator", "rustaceans");

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group]])
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );
        let message_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(group_db, message_db, profile_db);
        let result = service.get("p3", "g1").await.unwrap();

        assert!(result.is_none());
    }
}
