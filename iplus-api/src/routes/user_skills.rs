use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{NewUserSkill, Skill};
use crate::schema::{skills, user_skills};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/:skill_id", axum::routing::delete(destroy))
}

async fn index(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Skill>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let owned: Vec<Skill> = user_skills::table
        .inner_join(skills::table)
        .filter(user_skills::user_id.eq(principal.id))
        .select(skills::all_columns)
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(owned)))
}

#[derive(Debug, Deserialize)]
pub struct AttachSkillsRequest {
    pub skill_ids: Vec<Uuid>,
}

async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AttachSkillsRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<Skill>>>)> {
    if req.skill_ids.is_empty() {
        return Err(AppError::Validation("skill_ids must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let found: i64 = skills::table
        .filter(skills::id.eq_any(&req.skill_ids))
        .count()
        .get_result(&mut conn)?;
    if found != req.skill_ids.len() as i64 {
        return Err(AppError::new(ErrorCode::SkillNotFound, "one or more skill ids do not exist"));
    }

    let already: Vec<Uuid> = user_skills::table
        .filter(user_skills::user_id.eq(principal.id))
        .filter(user_skills::skill_id.eq_any(&req.skill_ids))
        .select(user_skills::skill_id)
        .load(&mut conn)?;

    let links: Vec<NewUserSkill> = req
        .skill_ids
        .iter()
        .filter(|id| !already.contains(id))
        .map(|id| NewUserSkill { user_id: principal.id, skill_id: *id })
        .collect();

    if !links.is_empty() {
        diesel::insert_into(user_skills::table)
            .values(&links)
            .execute(&mut conn)?;
    }

    let owned: Vec<Skill> = user_skills::table
        .inner_join(skills::table)
        .filter(user_skills::user_id.eq(principal.id))
        .select(skills::all_columns)
        .load(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(owned))))
}

async fn destroy(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(skill_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(
        user_skills::table
            .filter(user_skills::user_id.eq(principal.id))
            .filter(user_skills::skill_id.eq(skill_id)),
    )
    .execute(&mut conn)?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::SkillNotFound, "skill is not attached to your profile"));
    }

    Ok(Json(ApiResponse::message("Skill detached successfully")))
}
