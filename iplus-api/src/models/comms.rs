use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{contact_messages, conversations, messages, newsletter_subscriptions};

// --- Conversation (two participants, deduped by unordered pair) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = conversations)]
pub struct Conversation {
    pub id: Uuid,
    pub user_one_id: Uuid,
    pub user_two_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user_one_id == user_id || self.user_two_id == user_id
    }

    /// Unordered pair match: the row stored for (a, b) also answers (b, a).
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.user_one_id == a && self.user_two_id == b)
            || (self.user_one_id == b && self.user_two_id == a)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub user_one_id: Uuid,
    pub user_two_id: Uuid,
}

// --- Message (append-only) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
}

// --- Newsletter subscription ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = newsletter_subscriptions)]
pub struct NewsletterSubscription {
    pub id: Uuid,
    pub email: String,
    pub list: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = newsletter_subscriptions)]
pub struct NewNewsletterSubscription {
    pub email: String,
    pub list: String,
}

// --- Contact message ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = contact_messages)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = contact_messages)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_check_covers_both_sides() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let conv = Conversation {
            id: Uuid::now_v7(),
            user_one_id: a,
            user_two_id: b,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(conv.has_participant(a));
        assert!(conv.has_participant(b));
        assert!(!conv.has_participant(stranger));
    }

    #[test]
    fn pair_match_ignores_participant_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let conv = Conversation {
            id: Uuid::now_v7(),
            user_one_id: a,
            user_two_id: b,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(conv.is_between(a, b));
        assert!(conv.is_between(b, a));
        assert!(!conv.is_between(a, stranger));
    }
}
