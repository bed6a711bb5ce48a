//! Post, like, and comment endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use linkup_common::{AppError, AppResult};
use linkup_core::{CreateCommentInput, CreatePostInput};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthProfile, middleware::AppState, response::ApiResponse};

use super::default_limit;

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
}

impl From<linkup_db::entities::post::Model> for PostResponse {
    fn from(p: linkup_db::entities::post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            text: p.text,
            likes_count: p.likes_count,
            comments_count: p.comments_count,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<linkup_db::entities::comment::Model> for CommentResponse {
    fn from(c: linkup_db::entities::comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Create a post.
async fn create(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create_post(&profile.id, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// List request params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// The caller's feed.
async fn feed(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .feed(&profile.id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Get a post.
async fn show(
    AuthProfile(_profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .get_post(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post not found: {id}")))?;

    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post.
async fn remove(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete_post(&profile.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like a post.
async fn like(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.like(&profile.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Remove a like.
async fn unlike(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.unlike(&profile.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: String,
    pub post_id: String,
    pub profile_id: String,
    pub created_at: String,
}

impl From<linkup_db::entities::like::Model> for LikeResponse {
    fn from(l: linkup_db::entities::like::Model) -> Self {
        Self {
            id: l.id,
            post_id: l.post_id,
            profile_id: l.profile_id,
            created_at: l.created_at.to_rfc3339(),
        }
    }
}

/// List likes on a post.
async fn likes(
    AuthProfile(_profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<LikeResponse>>> {
    let likes = state
        .post_service
        .likes(&id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(likes.into_iter().map(Into::into).collect()))
}

/// List comments on a post.
async fn comments(
    AuthProfile(_profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .post_service
        .comments(&id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// Comment on a post.
async fn comment(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.post_service.comment(&profile.id, &id, input).await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Delete a comment.
async fn remove_comment(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .post_service
        .delete_comment(&profile.id, &comment_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Create the posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/feed", get(feed))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/like", post(like).delete(unlike))
        .route("/{id}/likes", get(likes))
        .route("/{id}/comments", get(comments).post(comment))
        .route("/comments/{comment_id}", delete(remove_comment))
}
