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

use crate::extractors::{AdminPrincipal, Principal};
use crate::models::{NewSkill, Skill, SkillCategory, SkillSubCategory, UpdateSkill};
use crate::schema::{skill_categories, skill_sub_categories, skills};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/categories", get(categories))
        .route("/categories/:category_id/sub-categories", get(sub_categories))
        .route("/categories/:category_id/skills", get(skills_by_category))
        .route("/sub-categories/:sub_category_id/skills", get(skills_by_sub_category))
        .route("/:id", get(show).put(update).delete(destroy))
}

async fn index(
    Principal(_principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Skill>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let all: Vec<Skill> = skills::table.order(skills::name.asc()).load(&mut conn)?;
    Ok(Json(ApiResponse::ok(all)))
}

async fn categories(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<SkillCategory>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let all: Vec<SkillCategory> = skill_categories::table
        .order(skill_categories::name.asc())
        .load(&mut conn)?;
    Ok(Json(ApiResponse::ok(all)))
}

async fn sub_categories(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<SkillSubCategory>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let subs: Vec<SkillSubCategory> = skill_sub_categories::table
        .filter(skill_sub_categories::category_id.eq(category_id))
        .order(skill_sub_categories::name.asc())
        .load(&mut conn)?;
    Ok(Json(ApiResponse::ok(subs)))
}

async fn skills_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Skill>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let found: Vec<Skill> = skills::table
        .filter(skills::category_id.eq(category_id))
        .order(skills::name.asc())
        .load(&mut conn)?;
    Ok(Json(ApiResponse::ok(found)))
}

async fn skills_by_sub_category(
    State(state): State<Arc<AppState>>,
    Path(sub_category_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Skill>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let found: Vec<Skill> = skills::table
        .filter(skills::sub_category_id.eq(sub_category_id))
        .order(skills::name.asc())
        .load(&mut conn)?;
    Ok(Json(ApiResponse::ok(found)))
}

async fn show(
    Principal(_principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Skill>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let skill: Skill = skills::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::SkillNotFound, "skill not found"))?;
    Ok(Json(ApiResponse::ok(skill)))
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
}

async fn store(
    AdminPrincipal(_admin): AdminPrincipal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSkillRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Skill>>)> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let category_exists: i64 = skill_categories::table
        .filter(skill_categories::id.eq(req.category_id))
        .count()
        .get_result(&mut conn)?;
    if category_exists == 0 {
        return Err(AppError::new(ErrorCode::CategoryNotFound, "category not found"));
    }

    let skill: Skill = diesel::insert_into(skills::table)
        .values(&NewSkill {
            name: req.name,
            category_id: req.category_id,
            sub_category_id: req.sub_category_id,
        })
        .get_result(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(skill))))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Option<Uuid>>,
}

async fn update(
    AdminPrincipal(_admin): AdminPrincipal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSkillRequest>,
) -> AppResult<Json<ApiResponse<Skill>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let skill: Skill = diesel::update(skills::table.find(id))
        .set(&UpdateSkill {
            name: req.name,
            category_id: req.category_id,
            sub_category_id: req.sub_category_id,
        })
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::SkillNotFound, "skill not found"))?;

    Ok(Json(ApiResponse::ok(skill)))
}

async fn destroy(
    AdminPrincipal(_admin): AdminPrincipal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(skills::table.find(id)).execute(&mut conn)?;
    if removed == 0 {
        return Err(AppError::new(ErrorCode::SkillNotFound, "skill not found"));
    }

    Ok(Json(ApiResponse::message("Skill deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use diesel::r2d2::{ConnectionManager, Pool};
    use diesel::PgConnection;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use iplus_shared::clients::email::EmailClient;
    use iplus_shared::clients::storage::StorageClient;

    // App state with no live database behind the pool; auth rejections
    // happen before any connection is checked out.
    fn test_state() -> Arc<AppState> {
        let config = AppConfig::default();
        let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
        Arc::new(AppState {
            db: Pool::builder()
                .min_idle(Some(0))
                .connection_timeout(Duration::from_millis(100))
                .build_unchecked(manager),
            email: EmailClient::new(&config.resend_api_key, &config.from_email, "I-Plus"),
            storage: StorageClient::configure(
                &config.s3_endpoint,
                &config.s3_access_key,
                &config.s3_secret_key,
                &config.s3_bucket,
                &config.s3_public_url,
            ),
            config,
        })
    }

    async fn get_status(path: &str) -> StatusCode {
        routes()
            .with_state(test_state())
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn skill_list_and_show_require_a_token() {
        assert_eq!(get_status("/").await, StatusCode::UNAUTHORIZED);
        let path = format!("/{}", Uuid::now_v7());
        assert_eq!(get_status(&path).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn category_queries_stay_public() {
        // No token: gets past auth and fails later on the dead pool instead.
        assert_ne!(get_status("/categories").await, StatusCode::UNAUTHORIZED);
    }
}
