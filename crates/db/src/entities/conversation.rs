//! Conversation entity for 1:1 direct-message threads.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A 1:1 thread keyed by its unordered participant pair.
///
/// Invariant: `participant_one_id < participant_two_id` (lexicographic
/// order over the identifiers), so at most one row exists per pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Participant in the lower slot.
    #[sea_orm(indexed)]
    pub participant_one_id: String,

    /// Participant in the higher slot.
    #[sea_orm(indexed)]
    pub participant_two_id: String,

    pub created_at: DateTimeWithTimeZone,

    /// Creation time of the newest message, bumped on every insert so
    /// conversation lists can order by recency without a separate query.
    pub last_message_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the given profile is one of the two participants.
    #[must_use]
    pub fn has_participant(&self, profile_id: &str) -> bool {
        self.participant_one_id == profile_id || self.participant_two_id == profile_id
    }

    /// The other participant, if the given profile is part of this
    /// conversation.
    #[must_use]
    pub fn partner_of(&self, profile_id: &str) -> Option<&str> {
        if self.participant_one_id == profile_id {
            Some(&self.participant_two_id)
        } else if self.participant_two_id == profile_id {
            Some(&self.participant_one_id)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ParticipantOneId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    ParticipantOne,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ParticipantTwoId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    ParticipantTwo,

    #[sea_orm(has_many = "super::message::Entity")]
    Messages,
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn conversation(one: &str, two: &str) -> Model {
        Model {
            id: "c1".to_string(),
            participant_one_id: one.to_string(),
            participant_two_id: two.to_string(),
            created_at: Utc::now().into(),
            last_message_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_has_participant() {
        let c = conversation("p1", "p2");
        assert!(c.has_participant("p1"));
        assert!(c.has_participant("p2"));
        assert!(!c.has_participant("p3"));
    }

    #[test]
    fn test_partner_of() {
        let c = conversation("p1", "p2");
        assert_eq!(c.partner_of("p1"), Some("p2"));
        assert_eq!(c.partner_of("p2"), Some("p1"));
        assert_eq!(c.partner_of("p3"), None);
    }
}
