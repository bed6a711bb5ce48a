//! linkup server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use linkup_api::{identity_middleware, router as api_router, AppState};
use linkup_common::Config;
use linkup_core::{
    ConversationService, EventPublisherService, FollowService, GroupService, NoOpEventPublisher,
    PostService, ProfileService, ReadStatusService,
};
use linkup_db::repositories::{
    CommentRepository, ConversationRepository, FollowEdgeRepository, FollowRequestRepository,
    GroupMessageRepository, GroupRepository, LikeRepository, MessageRepository, PostRepository,
    ProfileRepository, ReadStatusRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkup=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting linkup server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(linkup_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    linkup_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let profile_repo = ProfileRepository::new(db.clone());
    let post_repo = PostRepository::new(db.clone());
    let like_repo = LikeRepository::new(db.clone());
    let comment_repo = CommentRepository::new(db.clone());
    let follow_request_repo = FollowRequestRepository::new(db.clone());
    let follow_edge_repo = FollowEdgeRepository::new(db.clone());
    let conversation_repo = ConversationRepository::new(db.clone());
    let message_repo = MessageRepository::new(db.clone());
    let group_repo = GroupRepository::new(db.clone());
    let group_message_repo = GroupMessageRepository::new(db.clone());
    let read_status_repo = ReadStatusRepository::new(db.clone());

    // Real-time delivery is an external collaborator behind the publisher
    // trait; the no-op stands in until one is attached.
    let event_publisher: EventPublisherService = Arc::new(NoOpEventPublisher);

    // Services
    let profile_service = ProfileService::new(profile_repo.clone());
    let mut follow_service = FollowService::new(
        follow_request_repo,
        follow_edge_repo.clone(),
        profile_repo.clone(),
    );
    follow_service.set_event_publisher(event_publisher.clone());
    let post_service = PostService::new(
        post_repo,
        like_repo,
        comment_repo,
        follow_edge_repo.clone(),
    );
    let mut conversation_service = ConversationService::new(
        conversation_repo.clone(),
        message_repo.clone(),
        follow_edge_repo,
        profile_repo.clone(),
    );
    conversation_service.set_event_publisher(event_publisher.clone());
    let mut group_service = GroupService::new(
        group_repo.clone(),
        group_message_repo.clone(),
        profile_repo,
    );
    group_service.set_event_publisher(event_publisher);
    let read_status_service = ReadStatusService::new(
        read_status_repo,
        conversation_repo,
        group_repo,
        message_repo,
        group_message_repo,
    );

    let state = AppState {
        profile_service,
        follow_service,
        post_service,
        conversation_service,
        group_service,
        read_status_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
