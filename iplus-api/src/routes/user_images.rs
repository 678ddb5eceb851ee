use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{NewUserImage, UserImage};
use crate::schema::user_images;
use crate::services::authz::ensure_owner;
use crate::services::uploads::{self, AllowedMedia};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/:id", get(show).delete(destroy))
}

async fn index(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<UserImage>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let images: Vec<UserImage> = user_images::table
        .filter(user_images::user_id.eq(principal.id))
        .order(user_images::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(images)))
}

/// Upload (or replace) the caller's profile image. Old object is deleted
/// best-effort before the new one is stored.
async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UserImage>>)> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            upload = Some(uploads::read_upload(field, AllowedMedia::ImageOnly).await?);
        }
    }

    let up = upload.ok_or_else(|| AppError::Validation("image file is required".into()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: Option<UserImage> = user_images::table
        .filter(user_images::user_id.eq(principal.id))
        .first(&mut conn)
        .optional()?;

    if let Some(old) = &existing {
        state.storage.delete_by_url(&old.image_url).await;
    }

    let key = format!("user_images/{}/{}.{}", principal.id, Uuid::now_v7(), up.ext);
    let url = state
        .storage
        .upload(&key, up.data, &up.content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::UploadFailed, e))?;

    let image: UserImage = match existing {
        Some(old) => diesel::update(user_images::table.find(old.id))
            .set((
                user_images::image_url.eq(&url),
                user_images::updated_at.eq(chrono::Utc::now()),
            ))
            .get_result(&mut conn)?,
        None => diesel::insert_into(user_images::table)
            .values(&NewUserImage {
                user_id: principal.id,
                image_url: url.clone(),
            })
            .get_result(&mut conn)?,
    };

    tracing::info!(user_id = %principal.id, image_url = %url, "user image stored");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(image, "Image uploaded successfully")),
    ))
}

async fn show(
    Principal(_principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserImage>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let image: UserImage = user_images::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ImageNotFound, "image not found"))?;

    Ok(Json(ApiResponse::ok(image)))
}

async fn destroy(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let image: UserImage = user_images::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ImageNotFound, "image not found"))?;

    ensure_owner(&principal, image.user_id, ErrorCode::Forbidden)?;

    state.storage.delete_by_url(&image.image_url).await;
    diesel::delete(user_images::table.find(id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::message("Image deleted successfully")))
}
