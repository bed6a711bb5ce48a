//! Follow endpoints.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use linkup_common::AppResult;
use linkup_core::RelationState;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthProfile, middleware::AppState, response::ApiResponse};

use super::default_limit;

/// Request body naming the other profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowTarget {
    pub profile_id: String,
}

/// Follow request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequestResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: String,
    pub created_at: String,
}

impl From<linkup_db::entities::follow_request::Model> for FollowRequestResponse {
    fn from(r: linkup_db::entities::follow_request::Model) -> Self {
        use linkup_db::entities::follow_request::RequestStatus;

        let status = match r.status {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        };

        Self {
            id: r.id,
            sender_id: r.sender_id,
            receiver_id: r.receiver_id,
            status: status.to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Follow edge response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdgeResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<linkup_db::entities::follow_edge::Model> for FollowEdgeResponse {
    fn from(e: linkup_db::entities::follow_edge::Model) -> Self {
        Self {
            id: e.id,
            follower_id: e.follower_id,
            followee_id: e.followee_id,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Send (or re-send) a follow request.
async fn request(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<FollowTarget>,
) -> AppResult<ApiResponse<FollowRequestResponse>> {
    let request = state
        .follow_service
        .request_follow(&profile.id, &req.profile_id)
        .await?;

    Ok(ApiResponse::ok(request.into()))
}

/// Accept a follow request (receiver side).
async fn accept(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<FollowTarget>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .accept_request(&profile.id, &req.profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Reject a follow request (receiver side, row retained).
async fn reject(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<FollowTarget>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .reject_request(&profile.id, &req.profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Delete a received request entirely (receiver side).
async fn withdraw(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<FollowTarget>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .withdraw_request(&profile.id, &req.profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Cancel a sent request (sender side, pending only).
async fn cancel(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<FollowTarget>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .cancel_request(&profile.id, &req.profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Unfollow a profile.
async fn unfollow(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Json(req): Json<FollowTarget>,
) -> AppResult<ApiResponse<()>> {
    state
        .follow_service
        .unfollow(&profile.id, &req.profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Relation query params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationQuery {
    pub profile_id: String,
}

/// Relation between the caller and another profile.
async fn relation(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<RelationQuery>,
) -> AppResult<ApiResponse<RelationState>> {
    let relation = state
        .follow_service
        .relation(&profile.id, &query.profile_id)
        .await?;

    Ok(ApiResponse::ok(relation))
}

/// List request params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Pending follow requests received by the caller.
async fn pending(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<FollowRequestResponse>>> {
    let requests = state
        .follow_service
        .get_pending_requests(&profile.id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Follow requests sent by the caller.
async fn sent(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<FollowRequestResponse>>> {
    let requests = state
        .follow_service
        .get_sent_requests(&profile.id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Pending request count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountResponse {
    pub count: u64,
}

/// Count of pending requests received by the caller.
async fn pending_count(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PendingCountResponse>> {
    let count = state
        .follow_service
        .count_pending_requests(&profile.id)
        .await?;

    Ok(ApiResponse::ok(PendingCountResponse { count }))
}

/// The caller's followers.
async fn followers(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<FollowEdgeResponse>>> {
    let edges = state
        .follow_service
        .get_followers(&profile.id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(edges.into_iter().map(Into::into).collect()))
}

/// Profiles the caller is following.
async fn following(
    AuthProfile(profile): AuthProfile,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<FollowEdgeResponse>>> {
    let edges = state
        .follow_service
        .get_following(&profile.id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(edges.into_iter().map(Into::into).collect()))
}

/// Create the follows router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(request))
        .route("/accept", post(accept))
        .route("/reject", post(reject))
        .route("/withdraw", post(withdraw))
        .route("/cancel", post(cancel))
        .route("/unfollow", post(unfollow))
        .route("/relation", get(relation))
        .route("/requests", get(pending))
        .route("/requests/sent", get(sent))
        .route("/requests/count", get(pending_count))
        .route("/followers", get(followers))
        .route("/following", get(following))
}
