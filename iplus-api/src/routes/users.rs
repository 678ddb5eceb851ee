use axum::extract::{Multipart, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{NewUserImage, NewUserSkill, Skill, UpdateUser, User, UserImage};
use crate::schema::{skills, user_images, user_skills, users};
use crate::services::uploads::{self, AllowedMedia};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/details", get(get_details))
        .route("/", put(update_user))
        .route("/username", put(update_username))
        .route("/profile", post(update_profile))
}

#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub user: User,
    pub user_image: Option<String>,
    pub user_skills: Vec<Skill>,
}

async fn get_details(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserDetails>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user: User = users::table
        .find(principal.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let image: Option<UserImage> = user_images::table
        .filter(user_images::user_id.eq(user.id))
        .first(&mut conn)
        .optional()?;

    let user_skills: Vec<Skill> = user_skills::table
        .inner_join(skills::table)
        .filter(user_skills::user_id.eq(user.id))
        .select(skills::all_columns)
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(UserDetails {
        user,
        user_image: image.map(|i| i.image_url),
        user_skills,
    })))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    /// Accepted as `dd-mm-YYYY`, the format the mobile clients send.
    pub birthdate: Option<String>,
    pub bio: Option<String>,
    pub display_country: Option<bool>,
    pub display_birthdate: Option<bool>,
}

async fn update_user(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let changes = build_changeset(&mut conn, principal.id, &req)?;

    let user: User = diesel::update(users::table.find(principal.id))
        .set(&changes)
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok_with_message(user, "User details updated successfully")))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

async fn update_username(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateUsernameRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    if req.username.is_empty() || req.username.len() > 255 {
        return Err(AppError::Validation("username must be between 1 and 255 characters".into()));
    }

    let taken: i64 = users::table
        .filter(users::username.eq(&req.username))
        .filter(users::id.ne(principal.id))
        .count()
        .get_result(&mut conn)?;
    if taken > 0 {
        return Err(AppError::new(ErrorCode::UsernameTaken, "username already taken"));
    }

    let user: User = diesel::update(users::table.find(principal.id))
        .set((
            users::username.eq(&req.username),
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok_with_message(user, "Username updated successfully")))
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub user: User,
    pub image: Option<UserImage>,
    pub skills: Vec<Skill>,
}

/// Combined profile update: user fields + profile image replacement + skill
/// sync. All database writes run in one transaction; the object-store
/// delete/upload pair happens outside it, so a crash in between can orphan an
/// object — the row never points at a missing one though, because the upload
/// completes before any row is touched.
async fn update_profile(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    let mut fields = UpdateUserRequest::default();
    let mut skill_ids: Option<Vec<Uuid>> = None;
    let mut upload: Option<uploads::Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                upload = Some(uploads::read_upload(field, AllowedMedia::ImageOnly).await?);
            }
            "skills" => {
                let val = field.text().await.unwrap_or_default();
                let ids: Vec<Uuid> = serde_json::from_str(&val)
                    .map_err(|_| AppError::Validation("skills must be a JSON array of ids".into()))?;
                skill_ids = Some(ids);
            }
            "first_name" => fields.first_name = Some(field.text().await.unwrap_or_default()),
            "last_name" => fields.last_name = Some(field.text().await.unwrap_or_default()),
            "email" => fields.email = Some(field.text().await.unwrap_or_default()),
            "phone" => fields.phone = Some(field.text().await.unwrap_or_default()),
            "country" => fields.country = Some(field.text().await.unwrap_or_default()),
            "birthdate" => fields.birthdate = Some(field.text().await.unwrap_or_default()),
            "bio" => fields.bio = Some(field.text().await.unwrap_or_default()),
            _ => {}
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let changes = build_changeset(&mut conn, principal.id, &fields)?;

    if let Some(ids) = &skill_ids {
        let found: i64 = skills::table
            .filter(skills::id.eq_any(ids))
            .count()
            .get_result(&mut conn)?;
        if found != ids.len() as i64 {
            return Err(AppError::Validation("one or more skill ids do not exist".into()));
        }
    }

    let existing_image: Option<UserImage> = user_images::table
        .filter(user_images::user_id.eq(principal.id))
        .first(&mut conn)
        .optional()?;

    // Object-store work first: the new object must exist before the row
    // points at it. Not covered by the transaction below.
    let mut new_image_url: Option<String> = None;
    if let Some(up) = upload {
        if let Some(old) = &existing_image {
            state.storage.delete_by_url(&old.image_url).await;
        }
        let key = format!("user_images/{}/{}.{}", principal.id, Uuid::now_v7(), up.ext);
        let url = state
            .storage
            .upload(&key, up.data, &up.content_type)
            .await
            .map_err(|e| AppError::new(ErrorCode::UploadFailed, e))?;
        new_image_url = Some(url);
    }

    let principal_id = principal.id;
    let (user, image, synced_skills) = conn.transaction::<_, AppError, _>(|conn| {
        let user: User = diesel::update(users::table.find(principal_id))
            .set(&changes)
            .get_result(conn)
            .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        let image = match &new_image_url {
            Some(url) => Some(match &existing_image {
                Some(old) => diesel::update(user_images::table.find(old.id))
                    .set((
                        user_images::image_url.eq(url),
                        user_images::updated_at.eq(chrono::Utc::now()),
                    ))
                    .get_result::<UserImage>(conn)?,
                None => diesel::insert_into(user_images::table)
                    .values(&NewUserImage {
                        user_id: principal_id,
                        image_url: url.clone(),
                    })
                    .get_result::<UserImage>(conn)?,
            }),
            None => existing_image.clone(),
        };

        if let Some(ids) = &skill_ids {
            diesel::delete(user_skills::table.filter(user_skills::user_id.eq(principal_id)))
                .execute(conn)?;
            let links: Vec<NewUserSkill> = ids
                .iter()
                .map(|skill_id| NewUserSkill { user_id: principal_id, skill_id: *skill_id })
                .collect();
            diesel::insert_into(user_skills::table)
                .values(&links)
                .execute(conn)?;
        }

        let synced: Vec<Skill> = user_skills::table
            .inner_join(skills::table)
            .filter(user_skills::user_id.eq(principal_id))
            .select(skills::all_columns)
            .load(conn)?;

        Ok((user, image, synced))
    })?;

    tracing::info!(user_id = %principal.id, "profile updated");

    Ok(Json(ApiResponse::ok_with_message(
        UserProfileResponse { user, image, skills: synced_skills },
        "User profile updated successfully",
    )))
}

/// Shared between the JSON and multipart update paths: parses the birthdate,
/// re-checks email and phone uniqueness excluding the caller, stamps
/// `updated_at`.
fn build_changeset(
    conn: &mut PgConnection,
    user_id: Uuid,
    req: &UpdateUserRequest,
) -> AppResult<UpdateUser> {
    let birthdate = match &req.birthdate {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%d-%m-%Y")
                .map_err(|_| AppError::Validation("birthdate must be in dd-mm-YYYY format".into()))?,
        ),
        None => None,
    };

    if let Some(email) = &req.email {
        let taken: i64 = users::table
            .filter(users::email.eq(email.to_lowercase()))
            .filter(users::id.ne(user_id))
            .count()
            .get_result(conn)?;
        ensure_identifier_free(taken, ErrorCode::EmailAlreadyExists, "email")?;
    }

    if let Some(phone) = &req.phone {
        let taken: i64 = users::table
            .filter(users::phone.eq(phone))
            .filter(users::id.ne(user_id))
            .count()
            .get_result(conn)?;
        ensure_identifier_free(taken, ErrorCode::PhoneAlreadyExists, "phone number")?;
    }

    Ok(UpdateUser {
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        email: req.email.as_ref().map(|e| e.to_lowercase()),
        phone: req.phone.clone(),
        country: req.country.clone(),
        birthdate,
        bio: req.bio.clone(),
        display_country: req.display_country,
        display_birthdate: req.display_birthdate,
        updated_at: Some(chrono::Utc::now()),
    })
}

/// Duplicate account identifiers surface as a 422, never as a raw
/// unique-constraint error from the database.
fn ensure_identifier_free(taken: i64, code: ErrorCode, what: &str) -> AppResult<()> {
    if taken > 0 {
        return Err(AppError::new(code, format!("{what} already registered")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn taken_phone_number_maps_to_422() {
        assert!(ensure_identifier_free(0, ErrorCode::PhoneAlreadyExists, "phone number").is_ok());

        let err = ensure_identifier_free(1, ErrorCode::PhoneAlreadyExists, "phone number")
            .unwrap_err();
        match err {
            AppError::Known { code, .. } => {
                assert_eq!(code, ErrorCode::PhoneAlreadyExists);
                assert_eq!(code.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
