use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{access_tokens, password_reset_otps, user_images, user_skills, users};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub country: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub bio: Option<String>,
    pub display_country: bool,
    pub display_birthdate: bool,
    pub facebook_id: Option<String>,
    pub google_id: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub bio: Option<String>,
    pub display_country: Option<bool>,
    pub display_birthdate: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Access token (revocable bearer token; id is the JWT jti) ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = access_tokens)]
pub struct AccessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = access_tokens)]
pub struct NewAccessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

// --- Password reset OTP ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = password_reset_otps)]
pub struct PasswordResetOtp {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = password_reset_otps)]
pub struct NewPasswordResetOtp {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

// --- User image ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_images)]
pub struct UserImage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_images)]
pub struct NewUserImage {
    pub user_id: Uuid,
    pub image_url: String,
}

// --- User skill (N:M link) ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = user_skills)]
pub struct UserSkill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_skills)]
pub struct NewUserSkill {
    pub user_id: Uuid,
    pub skill_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: Uuid::now_v7(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: Some("ada".into()),
            email: "ada@example.com".into(),
            phone: Some("+10000000000".into()),
            password_hash: "$argon2id$...".into(),
            country: None,
            birthdate: None,
            bio: None,
            display_country: false,
            display_birthdate: false,
            facebook_id: None,
            google_id: None,
            role: "user".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
