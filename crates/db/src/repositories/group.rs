//! Group repository, including membership operations.
//!
//! Membership predicates (`is_member`, `is_admin`, `has_any_members`) read
//! the membership relation directly, with no caller-based filtering. They
//! are the trusted path the service layer's visibility rules call into, so
//! a membership check never evaluates the visibility rule it backs.

use std::sync::Arc;

use crate::entities::group_member::{self, GroupRole};
use crate::entities::{group, Group, GroupMember};
use linkup_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Group repository for database operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Group Operations ====================

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a group by ID, failing if it does not exist.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {id}")))
    }

    /// Create a new group.
    pub async fn create(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Groups the given profile is a member of (paginated).
    pub async fn find_joined_by_profile(
        &self,
        profile_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group::Model>> {
        Group::find()
            .join(JoinType::InnerJoin, group::Relation::Members.def())
            .filter(group_member::Column::ProfileId.eq(profile_id))
            .order_by_desc(group::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment members count atomically (single UPDATE query, no fetch).
    pub async fn increment_members_count(&self, group_id: &str) -> AppResult<()> {
        Group::update_many()
            .col_expr(
                group::Column::MembersCount,
                Expr::col(group::Column::MembersCount).add(1),
            )
            .filter(group::Column::Id.eq(group_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement members count atomically, clamped at zero.
    pub async fn decrement_members_count(&self, group_id: &str) -> AppResult<()> {
        Group::update_many()
            .col_expr(
                group::Column::MembersCount,
                Expr::cust("GREATEST(members_count - 1, 0)"),
            )
            .filter(group::Column::Id.eq(group_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Membership Operations ====================

    /// Find a membership row by group and profile.
    pub async fn find_member(
        &self,
        group_id: &str,
        profile_id: &str,
    ) -> AppResult<Option<group_member::Model>> {
        GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::ProfileId.eq(profile_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a membership row exists for (group, profile).
    pub async fn is_member(&self, group_id: &str, profile_id: &str) -> AppResult<bool> {
        Ok(self.find_member(group_id, profile_id).await?.is_some())
    }

    /// Whether a membership row with the admin role exists for
    /// (group, profile).
    pub async fn is_admin(&self, group_id: &str, profile_id: &str) -> AppResult<bool> {
        let member = GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::ProfileId.eq(profile_id))
            .filter(group_member::Column::Role.eq(GroupRole::Admin))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(member.is_some())
    }

    /// Whether the group has any membership rows at all. Used to allow the
    /// very first row (the creator) into an otherwise-empty group.
    pub async fn has_any_members(&self, group_id: &str) -> AppResult<bool> {
        let count = GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Add a member to a group.
    pub async fn add_member(
        &self,
        model: group_member::ActiveModel,
    ) -> AppResult<group_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a member from a group. Returns whether a row was removed.
    pub async fn remove_member(&self, group_id: &str, profile_id: &str) -> AppResult<bool> {
        let member = self.find_member(group_id, profile_id).await?;
        if let Some(m) = member {
            m.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(true);
        }
        Ok(false)
    }

    /// All membership rows of a group, oldest joiner first.
    pub async fn find_members(&self, group_id: &str) -> AppResult<Vec<group_member::Model>> {
        GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .order_by_asc(group_member::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count admins of a group.
    pub async fn count_admins(&self, group_id: &str) -> AppResult<u64> {
        GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::Role.eq(GroupRole::Admin))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

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

    #[tokio::test]
    async fn test_is_member_true() {
        let member = create_test_member("m1", "g1", "p1", GroupRole::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.is_member("g1", "p1").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_is_member_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.is_member("g1", "p2").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_is_admin_requires_admin_role() {
        // The role filter is part of the query, so a plain member row never
        // comes back from it.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.is_admin("g1", "p1").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_find_members() {
        let m1 = create_test_member("m1", "g1", "p1", GroupRole::Admin);
        let m2 = create_test_member("m2", "g1", "p2", GroupRole::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[m1, m2]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.find_members("g1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, GroupRole::Admin);
    }
}
