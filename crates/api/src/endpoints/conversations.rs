//! Conversation and direct-message endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use linkup_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthProfile, middleware::AppState, response::ApiResponse};

use super::default_limit;

/// Conversation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub participant_one_id: String,
    pub participant_two_id: String,
    pub created_at: String,
    pub last_message_at: String,
}

impl From<linkup_db::entities::conversation::Model> for ConversationResponse {
    fn from(c: linkup_db::entities::conversation::Model) -> Self {
        Self {
            id: c.id,
            participant_one_id: c.participant_one_id,
            participant_two_id: c.participant_two_id,
            created_at: c.created_at.to_rfc3339(),
            last_message_at: c.last_message_at.to_rfc3339(),
        }
    }
}

/// Conversation list entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryResponse {
    pub id: String,
    pub partner_id: String,
    pub partner_handle: String,
    pub partner_avatar_url: Option<String>,
    pub last_message_at: String,
}

/// Message response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<linkup_db::entities::message::Model> for MessageResponse {
    fn from(m: linkup_db::entities::message::Model) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            text: m.text,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Open request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub profile_id: String,
}

/// Open (or return) a conversation with another profile.
async fn open(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<OpenRequest>,
) -> AppResult<ApiResponse<ConversationResponse>> {
    let conversation = state
        .conversation_service
        .open(&profile.id, &req.profile_id)
        .await?;

    Ok(ApiResponse::ok(conversation.into()))
}

/// List query params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// List the caller's conversations.
async fn list(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ConversationSummaryResponse>>> {
    let summaries = state
        .conversation_service
        .list(&profile.id, query.limit)
        .await?;

    Ok(ApiResponse::ok(
        summaries
            .into_iter()
            .map(|s| ConversationSummaryResponse {
                id: s.conversation.id.clone(),
                partner_id: s.partner_id,
                partner_handle: s.partner_handle,
                partner_avatar_url: s.partner_avatar_url,
                last_message_at: s.conversation.last_message_at.to_rfc3339(),
            })
            .collect(),
    ))
}

/// Get a conversation.
async fn show(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ConversationResponse>> {
    let conversation = state
        .conversation_service
        .get(&profile.id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Conversation not found: {id}")))?;

    Ok(ApiResponse::ok(conversation.into()))
}

/// Message list query params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Messages in a conversation. Empty for non-participants.
async fn messages(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> AppResult<ApiResponse<Vec<MessageResponse>>> {
    let messages = state
        .conversation_service
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

/// Send a message.
async fn send(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let message = state
        .conversation_service
        .send_message(&profile.id, &id, req.text)
        .await?;

    Ok(ApiResponse::ok(message.into()))
}

/// Mark the conversation read up to now.
async fn mark_read(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .read_status_service
        .mark_conversation_read(&profile.id, &id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub unread: u64,
}

/// Unread message count for the caller.
async fn unread(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UnreadResponse>> {
    let unread = state
        .read_status_service
        .conversation_unread(&profile.id, &id)
        .await?;

    Ok(ApiResponse::ok(UnreadResponse { unread }))
}

/// Create the conversations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(open).get(list))
        .route("/{id}", get(show))
        .route("/{id}/messages", get(messages).post(send))
        .route("/{id}/read", post(mark_read))
        .route("/{id}/unread", get(unread))
}
