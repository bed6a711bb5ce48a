//! Conversation repository.

use std::sync::Arc;

use crate::entities::{conversation, Conversation};
use chrono::{DateTime, FixedOffset};
use linkup_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Conversation repository for database operations.
#[derive(Clone)]
pub struct ConversationRepository {
    db: Arc<DatabaseConnection>,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<conversation::Model>> {
        Conversation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a conversation by its canonical participant pair. Callers must
    /// order the pair before lookup; the unique index assumes it.
    pub async fn find_by_pair(
        &self,
        participant_one_id: &str,
        participant_two_id: &str,
    ) -> AppResult<Option<conversation::Model>> {
        Conversation::find()
            .filter(conversation::Column::ParticipantOneId.eq(participant_one_id))
            .filter(conversation::Column::ParticipantTwoId.eq(participant_two_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new conversation.
    pub async fn create(
        &self,
        model: conversation::ActiveModel,
    ) -> AppResult<conversation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get conversations a profile participates in, most recently active
    /// first (paginated).
    pub async fn find_for_profile(
        &self,
        profile_id: &str,
        limit: u64,
    ) -> AppResult<Vec<conversation::Model>> {
        Conversation::find()
            .filter(
                Condition::any()
                    .add(conversation::Column::ParticipantOneId.eq(profile_id))
                    .add(conversation::Column::ParticipantTwoId.eq(profile_id)),
            )
            .order_by_desc(conversation::Column::LastMessageAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Bump the activity timestamp (single UPDATE query, no fetch).
    pub async fn touch_last_message_at(
        &self,
        id: &str,
        at: DateTime<FixedOffset>,
    ) -> AppResult<()> {
        Conversation::update_many()
            .col_expr(conversation::Column::LastMessageAt, Expr::value(at))
            .filter(conversation::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

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
    async fn test_find_by_pair_found() {
        let conversation = create_test_conversation("c1", "p1", "p2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation.clone()]])
                .into_connection(),
        );

        let repo = ConversationRepository::new(db);
        let result = repo.find_by_pair("p1", "p2").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "c1");
    }

    #[tokio::test]
    async fn test_find_for_profile() {
        let c1 = create_test_conversation("c1", "p1", "p2");
        let c2 = create_test_conversation("c2", "p1", "p3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = ConversationRepository::new(db);
        let result = repo.find_for_profile("p1", 10).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
