//! API integration tests.
//!
//! These tests drive the router end to end over a mock database: the
//! identity middleware resolves the caller, the handler consults the
//! services, and authorization outcomes surface as HTTP statuses.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware, Router,
};
use chrono::Utc;
use linkup_api::{identity_middleware, middleware::AppState, router as api_router};
use linkup_core::{
    ConversationService, FollowService, GroupService, PostService, ProfileService,
    ReadStatusService,
};
use linkup_db::entities::{group, group_member, profile};
use linkup_db::repositories::{
    CommentRepository, ConversationRepository, FollowEdgeRepository, FollowRequestRepository,
    GroupMessageRepository, GroupRepository, LikeRepository, MessageRepository, PostRepository,
    ProfileRepository, ReadStatusRepository,
};
use sea_orm::{DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_profile(id: &str, subject: &str, handle: &str) -> profile::Model {
    profile::Model {
        id: id.to_string(),
        subject: subject.to_string(),
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

/// Build the full application state over a single shared connection, so
/// appended mock results are consumed in request order.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_request_repo = FollowRequestRepository::new(Arc::clone(&db));
    let follow_edge_repo = FollowEdgeRepository::new(Arc::clone(&db));
    let conversation_repo = ConversationRepository::new(Arc::clone(&db));
    let message_repo = MessageRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let group_message_repo = GroupMessageRepository::new(Arc::clone(&db));
    let read_status_repo = ReadStatusRepository::new(Arc::clone(&db));

    AppState {
        profile_service: ProfileService::new(profile_repo.clone()),
        follow_service: FollowService::new(
            follow_request_repo,
            follow_edge_repo.clone(),
            profile_repo.clone(),
        ),
        post_service: PostService::new(
            post_repo,
            like_repo,
            comment_repo,
            follow_edge_repo.clone(),
        ),
        conversation_service: ConversationService::new(
            conversation_repo.clone(),
            message_repo.clone(),
            follow_edge_repo,
            profile_repo.clone(),
        ),
        group_service: GroupService::new(
            group_repo.clone(),
            group_message_repo.clone(),
            profile_repo,
        ),
        read_status_service: ReadStatusService::new(
            read_status_repo,
            conversation_repo,
            group_repo,
            message_repo,
            group_message_repo,
        ),
    }
}

fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_me_requires_identity() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/profiles/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_resolved_profile() {
    let profile = create_test_profile("p1", "auth0|123", "alice");

    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[profile]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/profiles/me")
                .header("x-identity-subject", "auth0|123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_group_hidden_from_non_member() {
    let caller = create_test_profile("p3", "auth0|outsider", "mallory");
    let group = group::Model {
        id: "g1".to_string(),
        creator_id: "p1".to_string(),
        name: "rustaceans".to_string(),
        description: None,
        members_count: 1,
        created_at: Utc::now().into(),
        updated_at: None,
    };

    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        // identity resolution, group lookup, membership check (miss)
        .append_query_results([[caller]])
        .append_query_results([[group]])
        .append_query_results([Vec::<group_member::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/groups/g1")
                .header("x-identity-subject", "auth0|outsider")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Indistinguishable from a missing group.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_member_list_empty_for_non_member() {
    let caller = create_test_profile("p3", "auth0|outsider", "mallory");

    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        // identity resolution, membership check (miss)
        .append_query_results([[caller]])
        .append_query_results([Vec::<group_member::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/groups/g1/members")
                .header("x-identity-subject", "auth0|outsider")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // An empty list, not an error.
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"], serde_json::json!([]));
}
