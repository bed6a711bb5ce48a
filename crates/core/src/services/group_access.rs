//! Trusted membership checks for groups.
//!
//! "Who may see a group?" is answered by membership, and membership rows
//! themselves are only visible to members. Answering that with the
//! member-filtered view would mean evaluating the predicate to evaluate
//! the predicate. [`GroupAccess`] breaks the cycle: it reads the
//! membership relation through the repository, which applies no caller
//! filtering, and every group visibility rule in the service layer
//! consults it instead of re-querying the guarded view.
//!
//! The same pattern applies to any predicate over a relation it protects:
//! the check runs on the unfiltered path, the results callers see run on
//! the filtered one.

use linkup_common::{AppError, AppResult};
use linkup_db::{entities::group_member, repositories::GroupRepository};

/// Trusted, non-recursive membership predicates.
#[derive(Clone)]
pub struct GroupAccess {
    group_repo: GroupRepository,
}

impl GroupAccess {
    /// Create a new access checker over the group repository.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// Whether the profile is a member of the group.
    pub async fn is_member(&self, group_id: &str, profile_id: &str) -> AppResult<bool> {
        self.group_repo.is_member(group_id, profile_id).await
    }

    /// Whether the profile is an admin of the group.
    pub async fn is_admin(&self, group_id: &str, profile_id: &str) -> AppResult<bool> {
        self.group_repo.is_admin(group_id, profile_id).await
    }

    /// Whether the group has any members at all. Only used to let the very
    /// first membership row (the creator's) into an otherwise-empty group.
    pub async fn has_any_members(&self, group_id: &str) -> AppResult<bool> {
        self.group_repo.has_any_members(group_id).await
    }

    /// The caller's own membership row, if any.
    pub async fn membership(
        &self,
        group_id: &str,
        profile_id: &str,
    ) -> AppResult<Option<group_member::Model>> {
        self.group_repo.find_member(group_id, profile_id).await
    }

    /// Fail with a policy violation unless the profile is a member.
    pub async fn require_member(&self, group_id: &str, profile_id: &str) -> AppResult<()> {
        if self.is_member(group_id, profile_id).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Not a member of this group".to_string(),
            ))
        }
    }

    /// Fail with a policy violation unless the profile is an admin.
    pub async fn require_admin(&self, group_id: &str, profile_id: &str) -> AppResult<()> {
        if self.is_admin(group_id, profile_id).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Requires group admin".to_string(),
            ))
        }
    }
}
