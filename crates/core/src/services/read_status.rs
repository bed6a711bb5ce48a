//! Read status service.
//!
//! One marker per (profile, conversation) or (profile, group), upserted on
//! every read-marking event. Unread counts derive from messages newer than
//! the marker; clients never write the marker's timestamps themselves.

use chrono::Utc;
use linkup_common::{AppError, AppResult, IdGenerator};
use linkup_db::{
    entities::read_status,
    repositories::{
        ConversationRepository, GroupMessageRepository, GroupRepository, MessageRepository,
        ReadStatusRepository,
    },
};
use sea_orm::Set;

/// Read status service.
#[derive(Clone)]
pub struct ReadStatusService {
    read_status_repo: ReadStatusRepository,
    conversation_repo: ConversationRepository,
    group_repo: GroupRepository,
    message_repo: MessageRepository,
    group_message_repo: GroupMessageRepository,
    id_gen: IdGenerator,
}

impl ReadStatusService {
    /// Create a new read status service.
    #[must_use]
    pub fn new(
        read_status_repo: ReadStatusRepository,
        conversation_repo: ConversationRepository,
        group_repo: GroupRepository,
        message_repo: MessageRepository,
        group_message_repo: GroupMessageRepository,
    ) -> Self {
        Self {
            read_status_repo,
            conversation_repo,
            group_repo,
            message_repo,
            group_message_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Mark a conversation as read up to now. Participants only.
    pub async fn mark_conversation_read(
        &self,
        caller_id: &str,
        conversation_id: &str,
    ) -> AppResult<read_status::Model> {
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

        let existing = self
            .read_status_repo
            .find_for_conversation(caller_id, conversation_id)
            .await?;

        self.upsert(existing, caller_id, Some(conversation_id), None)
            .await
    }

    /// Mark a group as read up to now. Members only.
    pub async fn mark_group_read(
        &self,
        caller_id: &str,
        group_id: &str,
    ) -> AppResult<read_status::Model> {
        if !self.group_repo.is_member(group_id, caller_id).await? {
            return Err(AppError::Forbidden(
                "Not a member of this group".to_string(),
            ));
        }

        let existing = self
            .read_status_repo
            .find_for_group(caller_id, group_id)
            .await?;

        self.upsert(existing, caller_id, None, Some(group_id)).await
    }

    /// Upsert the marker. Exactly one of conversation/group is set; both
    /// callers above guarantee it.
    async fn upsert(
        &self,
        existing: Option<read_status::Model>,
        profile_id: &str,
        conversation_id: Option<&str>,
        group_id: Option<&str>,
    ) -> AppResult<read_status::Model> {
        let now = Utc::now();

        if let Some(marker) = existing {
            let mut active: read_status::ActiveModel = marker.into();
            active.last_read_at = Set(now.into());
            active.updated_at = Set(Some(now.into()));
            return self.read_status_repo.update(active).await;
        }

        let model = read_status::ActiveModel {
            id: Set(self.id_gen.generate()),
            profile_id: Set(profile_id.to_string()),
            conversation_id: Set(conversation_id.map(str::to_string)),
            group_id: Set(group_id.map(str::to_string)),
            last_read_at: Set(now.into()),
            updated_at: Set(None),
        };

        self.read_status_repo.create(model).await
    }

    /// Unread messages in a conversation for the caller. Zero for
    /// non-participants, like every other read in their blind spot.
    pub async fn conversation_unread(
        &self,
        caller_id: &str,
        conversation_id: &str,
    ) -> AppResult<u64> {
        let Some(conversation) = self.conversation_repo.find_by_id(conversation_id).await? else {
            return Ok(0);
        };

        if !conversation.has_participant(caller_id) {
            return Ok(0);
        }

        let marker = self
            .read_status_repo
            .find_for_conversation(caller_id, conversation_id)
            .await?;

        self.message_repo
            .count_unread(conversation_id, caller_id, marker.map(|m| m.last_read_at))
            .await
    }

    /// Unread messages in a group for the caller. Zero for non-members.
    pub async fn group_unread(&self, caller_id: &str, group_id: &str) -> AppResult<u64> {
        if !self.group_repo.is_member(group_id, caller_id).await? {
            return Ok(0);
        }

        let marker = self
            .read_status_repo
            .find_for_group(caller_id, group_id)
            .await?;

        self.group_message_repo
            .count_unread(group_id, caller_id, marker.map(|m| m.last_read_at))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use linkup_db::entities::{conversation, group_member};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_conversation(id: &str, one: &str, two: &str) -> conversation::Model {
        conversation::Model {
            id: id.to_string(),
            participant_one_id: one.to_string(),
            participant_two_id: two.to_string(),
            created_at: Utc::now().into(),
            last_message_at: Utc::now().into(),
        }
    }

    fn service_with(
        read_status_db: Arc<sea_orm::DatabaseConnection>,
        conversation_db: Arc<sea_orm::DatabaseConnection>,
        group_db: Arc<sea_orm::DatabaseConnection>,
    ) -> ReadStatusService {
        ReadStatusService::new(
            ReadStatusRepository::new(read_status_db),
            ConversationRepository::new(conversation_db),
            GroupRepository::new(group_db),
            MessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            GroupMessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
        )
    }

    #[tokio::test]
    async fn test_mark_conversation_read_rejects_non_participant() {
        let conversation = create_test_conversation("c1", "p1", "p2");

        let conversation_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation]])
                .into_connection(),
        );
        let read_status_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(read_status_db, conversation_db, group_db);
        let result = service.mark_conversation_read("p3", "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_group_read_rejects_non_member() {
        let read_status_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let conversation_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );

        let service = service_with(read_status_db, conversation_db, group_db);
        let result = service.mark_group_read("p3", "g1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_conversation_unread_zero_for_non_participant() {
        let conversation = create_test_conversation("c1", "p1", "p2");

        let conversation_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation]])
                .into_connection(),
        );
        let read_status_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(read_status_db, conversation_db, group_db);
        let result = service.conversation_unread("p3", "c1").await.unwrap();

        assert_eq!(result, 0);
    }
}
