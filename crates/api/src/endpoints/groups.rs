//! Group endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use linkup_common::{AppError, AppResult};
use linkup_core::CreateGroupInput;
use linkup_db::entities::group_member::GroupRole;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthProfile, middleware::AppState, response::ApiResponse};

use super::default_limit;

/// Group response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub description: Option<String>,
    pub members_count: i64,
    pub created_at: String,
}

impl From<linkup_db::entities::group::Model> for GroupResponse {
    fn from(g: linkup_db::entities::group::Model) -> Self {
        Self {
            id: g.id,
            creator_id: g.creator_id,
            name: g.name,
            description: g.description,
            members_count: g.members_count,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}

/// Group member response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberResponse {
    pub id: String,
    pub group_id: String,
    pub profile_id: String,
    pub role: String,
    pub joined_at: String,
}

impl From<linkup_db::entities::group_member::Model> for GroupMemberResponse {
    fn from(m: linkup_db::entities::group_member::Model) -> Self {
        let role = match m.role {
            GroupRole::Member => "member",
            GroupRole::Admin => "admin",
        };

        Self {
            id: m.id,
            group_id: m.group_id,
            profile_id: m.profile_id,
            role: role.to_string(),
            joined_at: m.joined_at.to_rfc3339(),
        }
    }
}

/// Group message response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageResponse {
    pub id: String,
    pub group_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<linkup_db::entities::group_message::Model> for GroupMessageResponse {
    fn from(m: linkup_db::entities::group_message::Model) -> Self {
        Self {
            id: m.id,
            group_id: m.group_id,
            sender_id: m.sender_id,
            text: m.text,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Create a group.
async fn create(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state.group_service.create(&profile.id, input).await?;
    Ok(ApiResponse::ok(group.into()))
}

/// List query params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Groups the caller is a member of.
async fn list(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<GroupResponse>>> {
    let groups = state
        .group_service
        .list_joined(&profile.id, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(groups.into_iter().map(Into::into).collect()))
}

/// Get a group the caller is a member of.
async fn show(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state
        .group_service
        .get(&profile.id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group not found: {id}")))?;

    Ok(ApiResponse::ok(group.into()))
}

/// Group member list. Empty for non-members.
async fn members(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<GroupMemberResponse>>> {
    let members = state.group_service.members(&profile.id, &id).await?;

    Ok(ApiResponse::ok(
        members.into_iter().map(Into::into).collect(),
    ))
}

/// Add member request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub profile_id: String,
    #[serde(default)]
    pub admin: bool,
}

/// Add a member to a group.
async fn add_member(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> AppResult<ApiResponse<GroupMemberResponse>> {
    let role = if req.admin {
        GroupRole::Admin
    } else {
        GroupRole::Member
    };

    let member = state
        .group_service
        .add_member(&profile.id, &id, &req.profile_id, role)
        .await?;

    Ok(ApiResponse::ok(member.into()))
}

/// Remove a member (or leave, when removing yourself).
async fn remove_member(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path((id, profile_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .group_service
        .remove_member(&profile.id, &id, &profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Message list query params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Messages in a group. Empty for non-members.
async fn messages(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> AppResult<ApiResponse<Vec<GroupMessageResponse>>> {
    let messages = state
        .group_service
        .messages(&profile.id, &id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        messages.into_iter().map(Into::into).collect(),
    ))
}

/// Send request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub text: String,
}

/// Send a group message.
async fn send(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<GroupMessageResponse>> {
    let message = state
        .group_service
        .send_message(&profile.id, &id, req.text)
        .await?;

    Ok(ApiResponse::ok(message.into()))
}

/// Mark the group read up to now.
async fn mark_read(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .read_status_service
        .mark_group_read(&profile.id, &id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub unread: u64,
}

/// Unread group message count for the caller.
async fn unread(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UnreadResponse>> {
    let unread = state
        .read_status_service
        .group_unread(&profile.id, &id)
        .await?;

    Ok(ApiResponse::ok(UnreadResponse { unread }))
}

/// Create the groups router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", get(show))
        .route("/{id}/members", get(members).post(add_member))
        .route("/{id}/members/{profile_id}", delete(remove_member))
        .route("/{id}/messages", get(messages).post(send))
        .route("/{id}/read", post(mark_read))
        .route("/{id}/unread", get(unread))
}
