pub mod health;
pub mod auth;
pub mod users;
pub mod user_images;
pub mod user_skills;
pub mod skills;
pub mod inspire;
pub mod inspire_comments;
pub mod inspire_saves;
pub mod reactions;
pub mod listings;
pub mod listing_requests;
pub mod conversations;
pub mod ratings;
pub mod newsletter;
pub mod contact;
