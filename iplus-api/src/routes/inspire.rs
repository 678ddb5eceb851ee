use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::extractors::{OptionalPrincipal, Principal};
use crate::models::{
    InspirePost, MediaKind, NewInspirePost, PostStatus, SubjectKind, UpdateInspirePost, User,
    UserImage,
};
use crate::schema::{inspire_posts, reactions, user_images, users};
use crate::services::authz::ensure_owner;
use crate::services::uploads::{self, AllowedMedia};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(index).post(store))
        .route("/posts/:id", get(show).put(update).delete(destroy))
}

/// One inspire post as the feed renders it: the row, the author's public
/// face, and whether the current viewer has reacted to it.
#[derive(Debug, Serialize)]
pub struct InspirePostView {
    #[serde(flatten)]
    pub post: InspirePost,
    pub author: AuthorSummary,
    pub liked_by_user: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub image_url: Option<String>,
}

impl AuthorSummary {
    fn from_parts(user: &User, image: Option<&UserImage>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            image_url: image.map(|i| i.image_url.clone()),
        }
    }
}

async fn index(
    OptionalPrincipal(viewer): OptionalPrincipal,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<InspirePostView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = inspire_posts::table.count().get_result(&mut conn)?;

    let rows: Vec<(InspirePost, User)> = inspire_posts::table
        .inner_join(users::table)
        .order(inspire_posts::created_at.desc())
        .limit(params.limit() as i64)
        .offset(params.offset() as i64)
        .load(&mut conn)?;

    let mut views = Vec::with_capacity(rows.len());
    for (post, author) in rows {
        let view = assemble_view(&mut conn, post, &author, viewer.as_ref().map(|v| v.id))?;
        views.push(view);
    }

    Ok(Json(ApiResponse::ok(Paginated::new(views, total as u64, &params))))
}

async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<InspirePost>>)> {
    let mut title: Option<String> = None;
    let mut content: Option<String> = None;
    let mut kind: Option<MediaKind> = None;
    let mut category_id: Option<Uuid> = None;
    let mut sub_category_id: Option<Uuid> = None;
    let mut media: Option<uploads::Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::BadRequest, format!("invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "media" => media = Some(uploads::read_upload(field, AllowedMedia::ImageOrVideo).await?),
            "title" => title = Some(read_text(field).await?),
            "content" => content = Some(read_text(field).await?),
            "kind" => {
                let raw = read_text(field).await?;
                kind = Some(
                    MediaKind::from_str(&raw).map_err(|e| AppError::Validation(e))?,
                );
            }
            "category_id" => category_id = Some(read_uuid(field).await?),
            "sub_category_id" => sub_category_id = Some(read_uuid(field).await?),
            _ => {}
        }
    }

    let title = require_field(title, "title")?;
    let content = require_field(content, "content")?;
    let kind = require_field(kind, "kind")?;
    let category_id = require_field(category_id, "category_id")?;
    let sub_category_id = require_field(sub_category_id, "sub_category_id")?;
    let media = media
        .ok_or_else(|| AppError::Validation("media file is required".into()))?;

    let key = format!("inspire/{}.{}", Uuid::now_v7(), media.ext);
    let media_url = state
        .storage
        .upload(&key, media.data, &media.content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::UploadFailed, e))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let post: InspirePost = diesel::insert_into(inspire_posts::table)
        .values(&NewInspirePost {
            user_id: principal.id,
            kind: kind.to_string(),
            title,
            content,
            media_url,
            status: PostStatus::Pending.to_string(),
            views: 0,
            category_id,
            sub_category_id,
        })
        .get_result(&mut conn)?;

    tracing::info!(post_id = %post.id, user_id = %principal.id, "inspire post created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post))))
}

async fn show(
    OptionalPrincipal(viewer): OptionalPrincipal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InspirePostView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Every read counts as a view.
    let post: InspirePost = diesel::update(inspire_posts::table.find(id))
        .set(inspire_posts::views.eq(inspire_posts::views + 1))
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::PostNotFound, "inspire post not found"))?;

    let author: User = users::table.find(post.user_id).first(&mut conn)?;
    let view = assemble_view(&mut conn, post, &author, viewer.as_ref().map(|v| v.id))?;

    Ok(Json(ApiResponse::ok(view)))
}

async fn update(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<InspirePost>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: InspirePost = inspire_posts::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::PostNotFound, "inspire post not found"))?;
    ensure_owner(&principal, existing.user_id, ErrorCode::Forbidden)?;

    let mut changes = UpdateInspirePost::default();
    let mut media: Option<uploads::Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::BadRequest, format!("invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "media" => media = Some(uploads::read_upload(field, AllowedMedia::ImageOrVideo).await?),
            "title" => changes.title = Some(read_text(field).await?),
            "content" => changes.content = Some(read_text(field).await?),
            "kind" => {
                let raw = read_text(field).await?;
                let kind = MediaKind::from_str(&raw).map_err(AppError::Validation)?;
                changes.kind = Some(kind.to_string());
            }
            "category_id" => changes.category_id = Some(read_uuid(field).await?),
            "sub_category_id" => changes.sub_category_id = Some(read_uuid(field).await?),
            _ => {}
        }
    }

    if let Some(media) = media {
        state.storage.delete_by_url(&existing.media_url).await;
        let key = format!("inspire/{}.{}", Uuid::now_v7(), media.ext);
        let url = state
            .storage
            .upload(&key, media.data, &media.content_type)
            .await
            .map_err(|e| AppError::new(ErrorCode::UploadFailed, e))?;
        changes.media_url = Some(url);
    }

    // Edited content goes back through moderation.
    changes.status = Some(PostStatus::Pending.to_string());
    changes.updated_at = Some(Utc::now());

    let post: InspirePost = diesel::update(inspire_posts::table.find(id))
        .set(&changes)
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok_with_message(post, "Inspire post updated successfully")))
}

async fn destroy(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: InspirePost = inspire_posts::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::PostNotFound, "inspire post not found"))?;
    ensure_owner(&principal, existing.user_id, ErrorCode::Forbidden)?;

    state.storage.delete_by_url(&existing.media_url).await;
    diesel::delete(inspire_posts::table.find(id)).execute(&mut conn)?;

    tracing::info!(post_id = %id, user_id = %principal.id, "inspire post deleted");

    Ok(Json(ApiResponse::message("Inspire post deleted successfully")))
}

fn assemble_view(
    conn: &mut PgConnection,
    post: InspirePost,
    author: &User,
    viewer: Option<Uuid>,
) -> AppResult<InspirePostView> {
    let image: Option<UserImage> = user_images::table
        .filter(user_images::user_id.eq(author.id))
        .first(conn)
        .optional()?;

    let liked_by_user = match viewer {
        Some(viewer_id) => {
            let count: i64 = reactions::table
                .filter(reactions::subject_kind.eq(SubjectKind::Inspire.to_string()))
                .filter(reactions::subject_id.eq(post.id))
                .filter(reactions::user_id.eq(viewer_id))
                .count()
                .get_result(conn)?;
            count > 0
        }
        None => false,
    };

    Ok(InspirePostView {
        post,
        author: AuthorSummary::from_parts(author, image.as_ref()),
        liked_by_user,
    })
}

pub(crate) async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::new(ErrorCode::BadRequest, format!("invalid field value: {e}")))
}

pub(crate) async fn read_uuid(field: axum::extract::multipart::Field<'_>) -> AppResult<Uuid> {
    let raw = read_text(field).await?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("invalid uuid: {raw}")))
}

pub(crate) fn require_field<T>(value: Option<T>, name: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("{name} is required")))
}
