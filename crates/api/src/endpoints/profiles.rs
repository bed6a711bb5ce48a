//! Profile endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use linkup_common::{AppError, AppResult};
use linkup_core::UpdateProfileInput;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthProfile, middleware::AppState, response::ApiResponse};

use super::default_limit;

/// Profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: String,
}

impl From<linkup_db::entities::profile::Model> for ProfileResponse {
    fn from(p: linkup_db::entities::profile::Model) -> Self {
        Self {
            id: p.id,
            handle: p.handle,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
            bio: p.bio,
            followers_count: p.followers_count,
            following_count: p.following_count,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Get the caller's own profile.
async fn me(AuthProfile(profile): AuthProfile) -> ApiResponse<ProfileResponse> {
    ApiResponse::ok(profile.into())
}

/// Update the caller's own profile.
async fn update_me(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let updated = state.profile_service.update(&profile.id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Get a profile by ID.
async fn show(
    AuthProfile(_profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::ProfileNotFound(id))?;

    Ok(ApiResponse::ok(profile.into()))
}

/// List request params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Posts authored by a profile.
async fn posts(
    AuthProfile(_profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PostListQuery>,
) -> AppResult<ApiResponse<Vec<super::posts::PostResponse>>> {
    let posts = state
        .post_service
        .posts_by(&id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Create the profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/{id}", get(show))
        .route("/{id}/posts", get(posts))
}
