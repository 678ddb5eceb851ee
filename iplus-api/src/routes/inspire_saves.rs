use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{InspirePost, InspireSave, NewInspireSave};
use crate::schema::{inspire_posts, inspire_saves};
use crate::services::authz::ensure_owner;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/saves", get(index))
        .route("/posts/:id/save", post(store))
        .route("/saves/:id", delete(destroy))
}

#[derive(Debug, Serialize)]
pub struct SaveView {
    #[serde(flatten)]
    pub save: InspireSave,
    pub post: InspirePost,
}

async fn index(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<SaveView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<(InspireSave, InspirePost)> = inspire_saves::table
        .inner_join(inspire_posts::table)
        .filter(inspire_saves::user_id.eq(principal.id))
        .order(inspire_saves::created_at.desc())
        .load(&mut conn)?;

    let saves = rows
        .into_iter()
        .map(|(save, post)| SaveView { save, post })
        .collect();

    Ok(Json(ApiResponse::ok(saves)))
}

async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ApiResponse<InspireSave>>)> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: i64 = inspire_posts::table
        .filter(inspire_posts::id.eq(post_id))
        .count()
        .get_result(&mut conn)?;
    if exists == 0 {
        return Err(AppError::new(ErrorCode::PostNotFound, "inspire post not found"));
    }

    let already: i64 = inspire_saves::table
        .filter(inspire_saves::inspire_id.eq(post_id))
        .filter(inspire_saves::user_id.eq(principal.id))
        .count()
        .get_result(&mut conn)?;
    if already > 0 {
        return Err(AppError::new(ErrorCode::AlreadySaved, "post already saved"));
    }

    let save: InspireSave = diesel::insert_into(inspire_saves::table)
        .values(&NewInspireSave {
            inspire_id: post_id,
            user_id: principal.id,
        })
        .get_result(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(save))))
}

async fn destroy(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let save: InspireSave = inspire_saves::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::SaveNotFound, "save not found"))?;
    ensure_owner(&principal, save.user_id, ErrorCode::Forbidden)?;

    diesel::delete(inspire_saves::table.find(id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::message("Save removed successfully")))
}
