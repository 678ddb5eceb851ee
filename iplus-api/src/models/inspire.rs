use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{inspire_comments, inspire_posts, inspire_saves, reactions};

// --- Inspire post ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = inspire_posts)]
pub struct InspirePost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub media_url: String,
    pub status: String,
    pub views: i32,
    pub category_id: Uuid,
    pub sub_category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inspire_posts)]
pub struct NewInspirePost {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub media_url: String,
    pub status: String,
    pub views: i32,
    pub category_id: Uuid,
    pub sub_category_id: Uuid,
}

/// Any accepted update pushes the post back to `pending` moderation; the
/// handler sets `status` accordingly rather than trusting the client.
#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = inspire_posts)]
pub struct UpdateInspirePost {
    pub kind: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Comment ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = inspire_comments)]
pub struct InspireComment {
    pub id: Uuid,
    pub inspire_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inspire_comments)]
pub struct NewInspireComment {
    pub inspire_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
}

// --- Save (bookmark) ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = inspire_saves)]
pub struct InspireSave {
    pub id: Uuid,
    pub inspire_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inspire_saves)]
pub struct NewInspireSave {
    pub inspire_id: Uuid,
    pub user_id: Uuid,
}

// --- Reaction (one per user and subject; presence means "liked") ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = reactions)]
pub struct Reaction {
    pub id: Uuid,
    pub subject_kind: String,
    pub subject_id: Uuid,
    pub user_id: Uuid,
    pub reaction: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reactions)]
pub struct NewReaction {
    pub subject_kind: String,
    pub subject_id: Uuid,
    pub user_id: Uuid,
    pub reaction: String,
}
