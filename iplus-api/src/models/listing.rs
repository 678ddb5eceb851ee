use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{ican_posts, ican_skills, ineed_posts, ineed_skills, listing_requests};

/// One row of either listing table. `ican_posts` and `ineed_posts` have an
/// identical column layout, so a single positional `Queryable` loads both;
/// inserts and updates go through the per-table structs below.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = ican_posts)]
pub struct Listing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub short_description: String,
    pub image_url: Option<String>,
    pub price: BigDecimal,
    pub price_type: String,
    pub status: String,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ican_posts)]
pub struct NewICanPost {
    pub user_id: Uuid,
    pub title: String,
    pub short_description: String,
    pub price: BigDecimal,
    pub price_type: String,
    pub status: String,
    pub location: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ineed_posts)]
pub struct NewINeedPost {
    pub user_id: Uuid,
    pub title: String,
    pub short_description: String,
    pub price: BigDecimal,
    pub price_type: String,
    pub status: String,
    pub location: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = ican_posts)]
pub struct UpdateICanPost {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<BigDecimal>,
    pub price_type: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = ineed_posts)]
pub struct UpdateINeedPost {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<BigDecimal>,
    pub price_type: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Listing <-> skill links ---

#[derive(Debug, Insertable)]
#[diesel(table_name = ican_skills)]
pub struct NewICanSkill {
    pub post_id: Uuid,
    pub skill_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ineed_skills)]
pub struct NewINeedSkill {
    pub post_id: Uuid,
    pub skill_id: Uuid,
}

// --- Listing request (apply / accept / reject) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = listing_requests)]
pub struct ListingRequest {
    pub id: Uuid,
    pub listing_kind: String,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = listing_requests)]
pub struct NewListingRequest {
    pub listing_kind: String,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
}
