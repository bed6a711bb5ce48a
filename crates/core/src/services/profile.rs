//! Profile service.
//!
//! Resolves an externally-authenticated identity to its single profile row
//! and provisions one lazily on first sign-in. Resolution reads through the
//! repository, which applies no caller filtering, so the lookup can back
//! any visibility predicate without becoming circular.

use chrono::Utc;
use linkup_common::{AppError, AppResult, IdGenerator};
use linkup_db::{entities::profile, repositories::ProfileRepository};
use sea_orm::Set;
use validator::Validate;

/// Profile hints supplied by the identity provider at first sign-in.
#[derive(Debug, Clone)]
pub struct ProfileHints {
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Input for updating a profile's display attributes. The identity linkage
/// (`subject`) and handle are not touched here.
#[derive(Debug, Default, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 128))]
    pub display_name: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    #[validate(length(max = 2048))]
    pub bio: Option<Option<String>>,
}

/// Profile service for identity resolution and provisioning.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self {
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve an external identity to its profile, if provisioned.
    pub async fn resolve(&self, subject: &str) -> AppResult<Option<profile::Model>> {
        self.profile_repo.find_by_subject(subject).await
    }

    /// Resolve an external identity, provisioning a profile on first
    /// sign-in. Idempotent: a second call for the same subject returns the
    /// existing row untouched.
    pub async fn ensure(&self, subject: &str, hints: ProfileHints) -> AppResult<profile::Model> {
        if let Some(existing) = self.profile_repo.find_by_subject(subject).await? {
            return Ok(existing);
        }

        if hints.handle.is_empty() {
            return Err(AppError::Validation("Handle must not be empty".to_string()));
        }

        // The handle is unique across profiles
        if self
            .profile_repo
            .find_by_handle(&hints.handle)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Handle already taken: {}",
                hints.handle
            )));
        }

        let model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            subject: Set(subject.to_string()),
            handle: Set(hints.handle),
            display_name: Set(hints.display_name),
            avatar_url: Set(hints.avatar_url),
            bio: Set(None),
            followers_count: Set(0),
            following_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let profile = self.profile_repo.create(model).await?;
        tracing::info!(profile_id = %profile.id, "Provisioned profile on first sign-in");

        Ok(profile)
    }

    /// Get a profile by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        self.profile_repo.find_by_id(id).await
    }

    /// Get a profile by handle.
    pub async fn get_by_handle(&self, handle: &str) -> AppResult<Option<profile::Model>> {
        self.profile_repo.find_by_handle(handle).await
    }

    /// Update a profile's display attributes.
    pub async fn update(
        &self,
        profile_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<profile::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let profile = self.profile_repo.get_by_id(profile_id).await?;
        let mut active: profile::ActiveModel = profile.into();

        if let Some(display_name) = input.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(avatar_url);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.profile_repo.update(active).await
    }
}
