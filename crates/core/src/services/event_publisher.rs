//! Event publisher service.
//!
//! Provides an abstraction for publishing real-time events. Newly inserted
//! rows carry their conversation/group identifier so an external delivery
//! channel can fan out to subscribers whose visible set matches; the
//! transport itself lives outside this crate.

use async_trait::async_trait;
use linkup_common::AppResult;
use std::sync::Arc;

/// Event types for real-time updates.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A profile followed another profile.
    Followed {
        follower_id: String,
        followee_id: String,
    },
    /// A profile unfollowed another profile.
    Unfollowed {
        follower_id: String,
        followee_id: String,
    },
    /// A new direct message was inserted.
    MessageCreated {
        id: String,
        conversation_id: String,
        sender_id: String,
    },
    /// A new group message was inserted.
    GroupMessageCreated {
        id: String,
        group_id: String,
        sender_id: String,
    },
}

/// Trait for publishing real-time events.
///
/// This allows the core services to publish events without directly
/// depending on a delivery implementation.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a followed event.
    async fn publish_followed(&self, follower_id: &str, followee_id: &str) -> AppResult<()>;

    /// Publish an unfollowed event.
    async fn publish_unfollowed(&self, follower_id: &str, followee_id: &str) -> AppResult<()>;

    /// Publish a direct message event, addressed by conversation.
    async fn publish_message_created(
        &self,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
    ) -> AppResult<()>;

    /// Publish a group message event, addressed by group.
    async fn publish_group_message_created(
        &self,
        id: &str,
        group_id: &str,
        sender_id: &str,
    ) -> AppResult<()>;
}

/// A no-op implementation of `EventPublisher` for testing or when real-time
/// delivery is disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish_followed(&self, _follower_id: &str, _followee_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_unfollowed(&self, _follower_id: &str, _followee_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn publish_message_created(
        &self,
        _id: &str,
        _conversation_id: &str,
        _sender_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn publish_group_message_created(
        &self,
        _id: &str,
        _group_id: &str,
        _sender_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `EventPublisher` trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;
