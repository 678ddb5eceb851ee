use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::{OptionalPrincipal, Principal};
use crate::models::{
    Listing, ListingKind, NewICanPost, NewICanSkill, NewINeedPost, NewINeedSkill, PostStatus,
    PriceType, UpdateICanPost, UpdateINeedPost,
};
use crate::routes::inspire::{read_text, read_uuid, require_field};
use crate::schema::{ican_posts, ican_skills, ineed_posts, ineed_skills, reactions, skills};
use crate::services::authz::ensure_owner;
use crate::services::uploads::{self, AllowedMedia};
use crate::AppState;

/// Listing routes for one kind. `/ican` and `/ineed` nest the same router;
/// the kind picks the backing table inside each handler.
pub fn routes(kind: ListingKind) -> Router<Arc<AppState>> {
    let collection = match kind {
        ListingKind::ICan => get(index_ican).post(store_ican),
        ListingKind::INeed => get(index_ineed).post(store_ineed),
    };
    let member = match kind {
        ListingKind::ICan => get(show_ican).put(update_ican).delete(destroy_ican),
        ListingKind::INeed => get(show_ineed).put(update_ineed).delete(destroy_ineed),
    };

    Router::new()
        .route("/posts", collection)
        .route("/posts/:id", member)
}

#[derive(Debug, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub liked_by_user: bool,
}

// Per-kind wrappers; axum handlers cannot take the kind as an argument.

async fn index_ican(
    viewer: OptionalPrincipal,
    state: State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ListingView>>>> {
    index(ListingKind::ICan, viewer, state).await
}

async fn index_ineed(
    viewer: OptionalPrincipal,
    state: State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ListingView>>>> {
    index(ListingKind::INeed, viewer, state).await
}

async fn store_ican(
    principal: Principal,
    state: State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Listing>>)> {
    store(ListingKind::ICan, principal, state, multipart).await
}

async fn store_ineed(
    principal: Principal,
    state: State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Listing>>)> {
    store(ListingKind::INeed, principal, state, multipart).await
}

async fn show_ican(
    viewer: OptionalPrincipal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingView>>> {
    show(ListingKind::ICan, viewer, state, path).await
}

async fn show_ineed(
    viewer: OptionalPrincipal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingView>>> {
    show(ListingKind::INeed, viewer, state, path).await
}

async fn update_ican(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Listing>>> {
    update(ListingKind::ICan, principal, state, path, multipart).await
}

async fn update_ineed(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Listing>>> {
    update(ListingKind::INeed, principal, state, path, multipart).await
}

async fn destroy_ican(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    destroy(ListingKind::ICan, principal, state, path).await
}

async fn destroy_ineed(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    destroy(ListingKind::INeed, principal, state, path).await
}

async fn index(
    kind: ListingKind,
    OptionalPrincipal(viewer): OptionalPrincipal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ListingView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let listings: Vec<Listing> = match kind {
        ListingKind::ICan => ican_posts::table
            .order(ican_posts::created_at.desc())
            .load(&mut conn)?,
        ListingKind::INeed => ineed_posts::table
            .order(ineed_posts::created_at.desc())
            .load(&mut conn)?,
    };

    let viewer_id = viewer.map(|v| v.id);
    let mut views = Vec::with_capacity(listings.len());
    for listing in listings {
        let liked_by_user = liked_by(&mut conn, kind, listing.id, viewer_id)?;
        views.push(ListingView { listing, liked_by_user });
    }

    Ok(Json(ApiResponse::ok(views)))
}

async fn show(
    kind: ListingKind,
    OptionalPrincipal(viewer): OptionalPrincipal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let listing = find_listing(&mut conn, kind, id)?;
    let liked_by_user = liked_by(&mut conn, kind, listing.id, viewer.map(|v| v.id))?;

    Ok(Json(ApiResponse::ok(ListingView { listing, liked_by_user })))
}

async fn store(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Listing>>)> {
    let mut title: Option<String> = None;
    let mut short_description: Option<String> = None;
    let mut price: Option<BigDecimal> = None;
    let mut price_type: Option<PriceType> = None;
    let mut location: Option<String> = None;
    let mut experience: Option<String> = None;
    let mut skill_ids: Vec<Uuid> = Vec::new();
    let mut image: Option<uploads::Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::BadRequest, format!("invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "image" => image = Some(uploads::read_upload(field, AllowedMedia::ImageOnly).await?),
            "title" => title = Some(read_text(field).await?),
            "short_description" => short_description = Some(read_text(field).await?),
            "price" => {
                let raw = read_text(field).await?;
                price = Some(parse_price(&raw)?);
            }
            "price_type" => {
                let raw = read_text(field).await?;
                price_type = Some(PriceType::from_str(&raw).map_err(AppError::Validation)?);
            }
            "location" => location = Some(read_text(field).await?),
            "experience" => experience = Some(read_text(field).await?),
            "skills" => {
                let raw = read_text(field).await?;
                skill_ids = parse_skill_ids(&raw)?;
            }
            _ => {}
        }
    }

    let title = require_field(title, "title")?;
    let short_description = require_field(short_description, "short_description")?;
    let price = require_field(price, "price")?;
    let price_type = require_field(price_type, "price_type")?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    validate_skills(&mut conn, &skill_ids)?;

    let listing: Listing = match kind {
        ListingKind::ICan => diesel::insert_into(ican_posts::table)
            .values(&NewICanPost {
                user_id: principal.id,
                title,
                short_description,
                price,
                price_type: price_type.to_string(),
                status: PostStatus::Pending.to_string(),
                location,
                experience,
            })
            .get_result(&mut conn)?,
        ListingKind::INeed => diesel::insert_into(ineed_posts::table)
            .values(&NewINeedPost {
                user_id: principal.id,
                title,
                short_description,
                price,
                price_type: price_type.to_string(),
                status: PostStatus::Pending.to_string(),
                location,
                experience,
            })
            .get_result(&mut conn)?,
    };

    link_skills(&mut conn, kind, listing.id, &skill_ids)?;

    // Image lands under a key derived from the new row's id, so the upload
    // has to happen after the insert.
    let listing = match image {
        Some(up) => {
            let key = format!("{}/{}/{}.{}", kind.storage_prefix(), listing.id, Uuid::now_v7(), up.ext);
            let url = state
                .storage
                .upload(&key, up.data, &up.content_type)
                .await
                .map_err(|e| AppError::new(ErrorCode::UploadFailed, e))?;
            set_image_url(&mut conn, kind, listing.id, &url)?
        }
        None => listing,
    };

    tracing::info!(listing_id = %listing.id, %kind, user_id = %principal.id, "listing created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(listing))))
}

async fn update(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Listing>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing = find_listing(&mut conn, kind, id)?;
    ensure_owner(&principal, existing.user_id, ErrorCode::Forbidden)?;

    let mut title: Option<String> = None;
    let mut short_description: Option<String> = None;
    let mut price: Option<BigDecimal> = None;
    let mut price_type: Option<String> = None;
    let mut status: Option<String> = None;
    let mut location: Option<String> = None;
    let mut experience: Option<String> = None;
    let mut image: Option<uploads::Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::BadRequest, format!("invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "image" => image = Some(uploads::read_upload(field, AllowedMedia::ImageOnly).await?),
            "title" => title = Some(read_text(field).await?),
            "short_description" => short_description = Some(read_text(field).await?),
            "price" => {
                let raw = read_text(field).await?;
                price = Some(parse_price(&raw)?);
            }
            "price_type" => {
                let raw = read_text(field).await?;
                price_type = Some(PriceType::from_str(&raw).map_err(AppError::Validation)?.to_string());
            }
            "status" => {
                let raw = read_text(field).await?;
                let parsed = PostStatus::from_str(&raw).map_err(AppError::Validation)?;
                // Owners can only toggle visibility; pending is moderation's.
                if parsed == PostStatus::Pending {
                    return Err(AppError::Validation("status must be active or inactive".into()));
                }
                status = Some(parsed.to_string());
            }
            "location" => location = Some(read_text(field).await?),
            "experience" => experience = Some(read_text(field).await?),
            _ => {}
        }
    }

    let mut image_url: Option<String> = None;
    if let Some(up) = image {
        if let Some(old) = &existing.image_url {
            state.storage.delete_by_url(old).await;
        }
        let key = format!("{}/{}/{}.{}", kind.storage_prefix(), id, Uuid::now_v7(), up.ext);
        let url = state
            .storage
            .upload(&key, up.data, &up.content_type)
            .await
            .map_err(|e| AppError::new(ErrorCode::UploadFailed, e))?;
        image_url = Some(url);
    }

    let listing: Listing = match kind {
        ListingKind::ICan => diesel::update(ican_posts::table.find(id))
            .set(&UpdateICanPost {
                title,
                short_description,
                image_url,
                price,
                price_type,
                status,
                location,
                experience,
                updated_at: Some(Utc::now()),
            })
            .get_result(&mut conn)?,
        ListingKind::INeed => diesel::update(ineed_posts::table.find(id))
            .set(&UpdateINeedPost {
                title,
                short_description,
                image_url,
                price,
                price_type,
                status,
                location,
                experience,
                updated_at: Some(Utc::now()),
            })
            .get_result(&mut conn)?,
    };

    Ok(Json(ApiResponse::ok_with_message(listing, "Listing updated successfully")))
}

async fn destroy(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing = find_listing(&mut conn, kind, id)?;
    ensure_owner(&principal, existing.user_id, ErrorCode::Forbidden)?;

    if let Some(url) = &existing.image_url {
        state.storage.delete_by_url(url).await;
    }

    match kind {
        ListingKind::ICan => {
            diesel::delete(ican_skills::table.filter(ican_skills::post_id.eq(id)))
                .execute(&mut conn)?;
            diesel::delete(ican_posts::table.find(id)).execute(&mut conn)?;
        }
        ListingKind::INeed => {
            diesel::delete(ineed_skills::table.filter(ineed_skills::post_id.eq(id)))
                .execute(&mut conn)?;
            diesel::delete(ineed_posts::table.find(id)).execute(&mut conn)?;
        }
    }

    tracing::info!(listing_id = %id, %kind, user_id = %principal.id, "listing deleted");

    Ok(Json(ApiResponse::message("Listing deleted successfully")))
}

pub(crate) fn find_listing(
    conn: &mut PgConnection,
    kind: ListingKind,
    id: Uuid,
) -> AppResult<Listing> {
    let found: Option<Listing> = match kind {
        ListingKind::ICan => ican_posts::table.find(id).first(conn).optional()?,
        ListingKind::INeed => ineed_posts::table.find(id).first(conn).optional()?,
    };
    found.ok_or_else(|| AppError::new(ErrorCode::ListingNotFound, "listing not found"))
}

fn liked_by(
    conn: &mut PgConnection,
    kind: ListingKind,
    listing_id: Uuid,
    viewer: Option<Uuid>,
) -> AppResult<bool> {
    let Some(viewer_id) = viewer else {
        return Ok(false);
    };
    let count: i64 = reactions::table
        .filter(reactions::subject_kind.eq(kind.as_subject().to_string()))
        .filter(reactions::subject_id.eq(listing_id))
        .filter(reactions::user_id.eq(viewer_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

fn parse_price(raw: &str) -> AppResult<BigDecimal> {
    let price = BigDecimal::from_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("invalid price: {raw}")))?;
    if price < BigDecimal::from(0) {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    Ok(price)
}

/// The `skills` multipart field carries a JSON array of skill ids.
fn parse_skill_ids(raw: &str) -> AppResult<Vec<Uuid>> {
    serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("skills must be a JSON array of skill ids".into()))
}

fn validate_skills(conn: &mut PgConnection, skill_ids: &[Uuid]) -> AppResult<()> {
    if skill_ids.is_empty() {
        return Ok(());
    }
    let known: i64 = skills::table
        .filter(skills::id.eq_any(skill_ids))
        .count()
        .get_result(conn)?;
    if known as usize != skill_ids.len() {
        return Err(AppError::new(ErrorCode::SkillNotFound, "one or more skills do not exist"));
    }
    Ok(())
}

fn link_skills(
    conn: &mut PgConnection,
    kind: ListingKind,
    post_id: Uuid,
    skill_ids: &[Uuid],
) -> AppResult<()> {
    if skill_ids.is_empty() {
        return Ok(());
    }
    match kind {
        ListingKind::ICan => {
            let rows: Vec<NewICanSkill> = skill_ids
                .iter()
                .map(|&skill_id| NewICanSkill { post_id, skill_id })
                .collect();
            diesel::insert_into(ican_skills::table).values(&rows).execute(conn)?;
        }
        ListingKind::INeed => {
            let rows: Vec<NewINeedSkill> = skill_ids
                .iter()
                .map(|&skill_id| NewINeedSkill { post_id, skill_id })
                .collect();
            diesel::insert_into(ineed_skills::table).values(&rows).execute(conn)?;
        }
    }
    Ok(())
}

fn set_image_url(
    conn: &mut PgConnection,
    kind: ListingKind,
    id: Uuid,
    url: &str,
) -> AppResult<Listing> {
    let listing = match kind {
        ListingKind::ICan => diesel::update(ican_posts::table.find(id))
            .set(ican_posts::image_url.eq(url))
            .get_result(conn)?,
        ListingKind::INeed => diesel::update(ineed_posts::table.find(id))
            .set(ineed_posts::image_url.eq(url))
            .get_result(conn)?,
    };
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parsing() {
        assert!(parse_price("12.50").is_ok());
        assert!(parse_price(" 40 ").is_ok());
        assert!(parse_price("-1").is_err());
        assert!(parse_price("free").is_err());
    }

    #[test]
    fn skill_ids_parse_from_json() {
        let id = Uuid::now_v7();
        let parsed = parse_skill_ids(&format!("[\"{id}\"]")).unwrap();
        assert_eq!(parsed, vec![id]);
        assert!(parse_skill_ids("not json").is_err());
    }
}
