use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{InspireComment, NewInspireComment};
use crate::schema::{inspire_comments, inspire_posts};
use crate::services::authz::ensure_owner;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts/:id/comments", get(index).post(store))
        .route("/comments/:id", get(show).put(update).delete(destroy))
}

async fn index(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<InspireComment>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_post_exists(&mut conn, post_id)?;

    let comments: Vec<InspireComment> = inspire_comments::table
        .filter(inspire_comments::inspire_id.eq(post_id))
        .order(inspire_comments::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(comments)))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<InspireComment>>)> {
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("comment body must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_post_exists(&mut conn, post_id)?;

    let comment: InspireComment = diesel::insert_into(inspire_comments::table)
        .values(&NewInspireComment {
            inspire_id: post_id,
            user_id: principal.id,
            body: req.body,
        })
        .get_result(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InspireComment>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let comment: InspireComment = inspire_comments::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::CommentNotFound, "comment not found"))?;

    Ok(Json(ApiResponse::ok(comment)))
}

async fn update(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<ApiResponse<InspireComment>>> {
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("comment body must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: InspireComment = inspire_comments::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::CommentNotFound, "comment not found"))?;
    ensure_owner(&principal, existing.user_id, ErrorCode::Forbidden)?;

    let comment: InspireComment = diesel::update(inspire_comments::table.find(id))
        .set((
            inspire_comments::body.eq(req.body),
            inspire_comments::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok_with_message(comment, "Comment updated successfully")))
}

async fn destroy(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: InspireComment = inspire_comments::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::CommentNotFound, "comment not found"))?;
    ensure_owner(&principal, existing.user_id, ErrorCode::Forbidden)?;

    diesel::delete(inspire_comments::table.find(id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::message("Comment deleted successfully")))
}

fn ensure_post_exists(conn: &mut PgConnection, post_id: Uuid) -> AppResult<()> {
    let exists: i64 = inspire_posts::table
        .filter(inspire_posts::id.eq(post_id))
        .count()
        .get_result(conn)?;
    if exists == 0 {
        return Err(AppError::new(ErrorCode::PostNotFound, "inspire post not found"));
    }
    Ok(())
}
