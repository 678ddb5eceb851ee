use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::{AdminPrincipal, Principal};
use crate::models::{ListingKind, NewRating, Rating, RatingStatus};
use crate::schema::{ratings, users};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/:id/status", put(update_status))
}

#[derive(Debug, Deserialize, Default)]
pub struct RatingFilter {
    pub kind: Option<ListingKind>,
}

/// Public feed of moderated ratings, filtered by listing kind.
async fn index(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RatingFilter>,
) -> AppResult<Json<ApiResponse<Vec<Rating>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let kind = filter.kind.unwrap_or(ListingKind::INeed);

    let approved: Vec<Rating> = ratings::table
        .filter(ratings::status.eq(RatingStatus::Approved.to_string()))
        .filter(ratings::listing_kind.eq(kind.to_string()))
        .order(ratings::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(approved)))
}

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub rated_id: Uuid,
    pub listing_kind: ListingKind,
    pub score: i32,
    pub review: Option<String>,
}

async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Rating>>)> {
    if !(1..=5).contains(&req.score) {
        return Err(AppError::Validation("score must be between 1 and 5".into()));
    }
    if req.rated_id == principal.id {
        return Err(AppError::Validation("cannot rate yourself".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rated_exists: i64 = users::table
        .filter(users::id.eq(req.rated_id))
        .count()
        .get_result(&mut conn)?;
    if rated_exists == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "rated user not found"));
    }

    let rating: Rating = diesel::insert_into(ratings::table)
        .values(&NewRating {
            rater_id: principal.id,
            rated_id: req.rated_id,
            listing_kind: req.listing_kind.to_string(),
            score: req.score,
            review: req.review,
            status: RatingStatus::Pending.to_string(),
        })
        .get_result(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(rating))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRatingStatusRequest {
    pub status: RatingStatus,
}

async fn update_status(
    AdminPrincipal(_admin): AdminPrincipal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRatingStatusRequest>,
) -> AppResult<Json<ApiResponse<Rating>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rating: Rating = diesel::update(ratings::table.find(id))
        .set((
            ratings::status.eq(req.status.to_string()),
            ratings::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::RatingNotFound, "rating not found"))?;

    tracing::info!(rating_id = %id, status = %req.status, "rating moderated");

    Ok(Json(ApiResponse::ok(rating)))
}
