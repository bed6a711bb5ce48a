//! Conversation service for 1:1 direct messages.
//!
//! A conversation and its messages are visible only to the two
//! participants; for everyone else reads come back empty and writes are
//! rejected. Opening a thread requires mutual follow at creation time;
//! participation alone carries the thread afterwards.

use crate::services::event_publisher::EventPublisherService;
use chrono::Utc;
use linkup_common::{canonical_pair, AppError, AppResult, IdGenerator};
use linkup_db::{
    entities::{conversation, message},
    repositories::{
        ConversationRepository, FollowEdgeRepository, MessageRepository, ProfileRepository,
    },
};
use sea_orm::Set;

/// Conversation summary for listing.
pub struct ConversationSummary {
    pub conversation: conversation::Model,
    pub partner_id: String,
    pub partner_handle: String,
    pub partner_avatar_url: Option<String>,
}

/// Conversation service.
#[derive(Clone)]
pub struct ConversationService {
    conversation_repo: ConversationRepository,
    message_repo: MessageRepository,
    follow_edge_repo: FollowEdgeRepository,
    profile_repo: ProfileRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl ConversationService {
    /// Create a new conversation service.
    #[must_use]
    pub fn new(
        conversation_repo: ConversationRepository,
        message_repo: MessageRepository,
        follow_edge_repo: FollowEdgeRepository,
        profile_repo: ProfileRepository,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
            follow_edge_repo,
            profile_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Open (or return) the conversation between the caller and another
    /// profile.
    ///
    /// The pair is canonicalized before lookup and insert, so the same row
    /// is reused regardless of argument order. Requires mutual follow at
    /// creation time.
    pub async fn open(&self, caller_id: &str, other_id: &str) -> AppResult<conversation::Model> {
        if caller_id == other_id {
            return Err(AppError::BadRequest(
                "Cannot open a conversation with yourself".to_string(),
            ));
        }

        self.profile_repo.get_by_id(other_id).await?;

        let mutual = self.follow_edge_repo.is_following(caller_id, other_id).await?
            && self.follow_edge_repo.is_following(other_id, caller_id).await?;
        if !mutual {
            return Err(AppError::Forbidden(
                "Conversations require a mutual follow".to_string(),
            ));
        }

        let (one, two) = canonical_pair(caller_id, other_id);

        if let Some(existing) = self.conversation_repo.find_by_pair(one, two).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = conversation::ActiveModel {
            id: Set(self.id_gen.generate()),
            participant_one_id: Set(one.to_string()),
            participant_two_id: Set(two.to_string()),
            created_at: Set(now.into()),
            last_message_at: Set(now.into()),
        };

        match self.conversation_repo.create(model).await {
            Ok(created) => Ok(created),
            // A concurrent open for the same pair loses the insert race on
            // the unique index; the existing row is the answer.
            Err(create_err) => match self.conversation_repo.find_by_pair(one, two).await? {
                Some(existing) => Ok(existing),
                None => Err(create_err),
            },
        }
    }

    /// Get a conversation the caller participates in. Returns `None` for
    /// non-participants, indistinguishable from a missing row.
    pub async fn get(
        &self,
        caller_id: &str,
        conversation_id: &str,
    ) -> AppResult<Option<conversation::Model>> {
        let conversation = self.conversation_repo.find_by_id(conversation_id).await?;

        Ok(conversation.filter(|c| c.has_participant(caller_id)))
    }

    /// List the caller's conversations, most recently active first.
    pub async fn list(&self, caller_id: &str, limit: u64) -> AppResult<Vec<ConversationSummary>> {
        let conversations = self
            .conversation_repo
            .find_for_profile(caller_id, limit)
            .await?;

        let mut summaries = Vec::new();

        for conversation in conversations {
            let Some(partner_id) = conversation.partner_of(caller_id).map(str::to_string) else {
                continue;
            };

            if let Some(partner) = self.profile_repo.find_by_id(&partner_id).await? {
                summaries.push(ConversationSummary {
                    conversation,
                    partner_id: partner.id,
                    partner_handle: partner.handle,
                    partner_avatar_url: partner.avatar_url,
                });
            }
        }

        Ok(summaries)
    }

    /// Send a message into a conversation.
    ///
    /// The caller must be a participant and is always the declared sender.
    /// Insertion bumps the conversation's activity timestamp to the
    /// message's creation time.
    pub async fn send_message(
        &self,
        caller_id: &str,
        conversation_id: &str,
        text: String,
    ) -> AppResult<message::Model> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest("Message must have text".to_string()));
        }

        let conversation = self
            .conversation_repo
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Conversation not found: {conversation_id}"))
            })?;

        if !conversation.has_participant(caller_id) {
            return Err(AppError::Forbidden(
                "Not a participant of this conversation".to_string(),
            ));
        }

        let now = Utc::now();
        let model = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            conversation_id: Set(conversation_id.to_string()),
            sender_id: Set(caller_id.to_string()),
            text: Set(text),
            created_at: Set(now.into()),
        };

        let message = self.message_repo.create(model).await?;

        self.conversation_repo
            .touch_last_message_at(conversation_id, message.created_at)
            .await?;

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish_message_created(&message.id, conversation_id, caller_id)
                .await
        {
            tracing::warn!(error = %e, "Failed to publish message event");
        }

        Ok(message)
    }

    /// Get messages in a conversation, newest first.
    ///
    /// Non-participants get an empty result set, not an error.
    pub async fn messages(
        &self,
        caller_id: &str,
        conversation_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<message::Model>> {
        let Some(conversation) = self.conversation_repo.find_by_id(conversation_id).await? else {
            return Ok(Vec::new());
        };

        if !conversation.has_participant(caller_id) {
            return Ok(Vec::new());
        }

        self.message_repo
            .find_by_conversation(conversation_id, limit, until_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use linkup_db::entities::{follow_edge, profile};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_profile(id: &str, handle: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            subject: format!("auth0|{id}"),
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

    fn create_test_edge(id: &str, follower_id: &str, followee_id: &str) -> follow_edge::Model {
        follow_edge::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_conversation(id: &str, one: &str, two: &str) -> conversation::Model {
        conversation::Model {
            id: id.to_string(),
            participant_one_id: one.to_string(),
            participant_two_id: two.to_string(),
            created_at: Utc::now().into(),
            last_message_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_open_with_yourself_is_error() {
        let service = ConversationService::new(
            ConversationRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            FollowEdgeRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            ProfileRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
        );

        let result = service.open("p1", "p1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_open_requires_mutual_follow() {
        // p1 follows p2 but p2 does not follow back.
        let edge = create_test_edge("e1", "p1", "p2");

        let edge_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![edge], Vec::<follow_edge::Model>::new()])
                .into_connection(),
        );
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("p2", "bob")]])
                .into_connection(),
        );

        let service = ConversationService::new(
            ConversationRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            FollowEdgeRepository::new(edge_db),
            ProfileRepository::new(profile_db),
        );

        let result = service.open("p1", "p2").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_open_reuses_existing_row_either_argument_order() {
        let existing = create_test_conversation("c1", "p1", "p2");

        // Two opens: (p1, p2) and (p2, p1). Both resolve mutual follow and
        // then find the same canonical row.
        let edge_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![create_test_edge("e1", "p1", "p2")],
                    vec![create_test_edge("e2", "p2", "p1")],
                    vec![create_test_edge("e2", "p2", "p1")],
                    vec![create_test_edge("e1", "p1", "p2")],
                ])
                .into_connection(),
        );
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    [create_test_profile("p2", "bob")],
                    [create_test_profile("p1", "alice")],
                ])
                .into_connection(),
        );
        let conversation_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()], [existing.clone()]])
                .into_connection(),
        );

        let service = ConversationService::new(
            ConversationRepository::new(conversation_db),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            FollowEdgeRepository::new(edge_db),
            ProfileRepository::new(profile_db),
        );

        let first = service.open("p1", "p2").await.unwrap();
        let second = service.open("p2", "p1").await.unwrap();

        assert_eq!(first.id, "c1");
        assert_eq!(second.id, "c1");
    }

    #[tokio::test]
    async fn test_send_message_rejects_non_participant() {
        let conversation = create_test_conversation("c1", "p1", "p2");

        let conversation_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation]])
                .into_connection(),
        );

        let service = ConversationService::new(
            ConversationRepository::new(conversation_db),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            FollowEdgeRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            ProfileRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
        );

        let result = service.send_message("p3", "c1", "hi".to_string()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_messages_empty_for_non_participant() {
        let conversation = create_test_conversation("c1", "p1", "p2");

        let conversation_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation]])
                .into_connection(),
        );

        let service = ConversationService::new(
            ConversationRepository::new(conversation_db),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            FollowEdgeRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            ProfileRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
        );

        let result = service.messages("p3", "c1", 10, None).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_get_filters_out_non_participant() {
        let conversation = create_test_conversation("c1", "p1", "p2");

        let conversation_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation]])
                .into_connection(),
        );

        let service = ConversationService::new(
            ConversationRepository::new(conversation_db),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            FollowEdgeRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            ProfileRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
        );

        let result = service.get("p3", "c1").await.unwrap();
        assert!(result.is_none());
    }
}
