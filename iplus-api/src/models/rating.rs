use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::ratings;

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = ratings)]
pub struct Rating {
    pub id: Uuid,
    pub rater_id: Uuid,
    pub rated_id: Uuid,
    pub listing_kind: String,
    pub score: i32,
    pub review: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ratings)]
pub struct NewRating {
    pub rater_id: Uuid,
    pub rated_id: Uuid,
    pub listing_kind: String,
    pub score: i32,
    pub review: Option<String>,
    pub status: String,
}
