use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{NewReaction, Reaction, ReactionType, SubjectKind};
use crate::schema::{ican_posts, ineed_posts, inspire_posts, reactions};
use crate::services::authz::ensure_owner;
use crate::AppState;

/// Reaction routes for one subject family. Nested under `/inspire`, `/ican`
/// and `/ineed`; the same handlers serve all three, keyed by `SubjectKind`.
pub fn routes(kind: SubjectKind) -> Router<Arc<AppState>> {
    let (list, remove) = match kind {
        SubjectKind::Inspire => (get(list_inspire).post(store_inspire), delete(destroy_inspire)),
        SubjectKind::ICan => (get(list_ican).post(store_ican), delete(destroy_ican)),
        SubjectKind::INeed => (get(list_ineed).post(store_ineed), delete(destroy_ineed)),
    };

    Router::new()
        .route("/posts/:id/reactions", list)
        .route("/reactions/:id", remove)
}

async fn list_inspire(
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Reaction>>>> {
    index(SubjectKind::Inspire, state, path).await
}

async fn list_ican(
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Reaction>>>> {
    index(SubjectKind::ICan, state, path).await
}

async fn list_ineed(
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Reaction>>>> {
    index(SubjectKind::INeed, state, path).await
}

async fn store_inspire(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
    body: Json<CreateReactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reaction>>)> {
    store(SubjectKind::Inspire, principal, state, path, body).await
}

async fn store_ican(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
    body: Json<CreateReactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reaction>>)> {
    store(SubjectKind::ICan, principal, state, path, body).await
}

async fn store_ineed(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
    body: Json<CreateReactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reaction>>)> {
    store(SubjectKind::INeed, principal, state, path, body).await
}

async fn destroy_inspire(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    destroy(SubjectKind::Inspire, principal, state, path).await
}

async fn destroy_ican(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    destroy(SubjectKind::ICan, principal, state, path).await
}

async fn destroy_ineed(
    principal: Principal,
    state: State<Arc<AppState>>,
    path: Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    destroy(SubjectKind::INeed, principal, state, path).await
}

async fn index(
    kind: SubjectKind,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Reaction>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_subject_exists(&mut conn, kind, post_id)?;

    let found: Vec<Reaction> = reactions::table
        .filter(reactions::subject_kind.eq(kind.to_string()))
        .filter(reactions::subject_id.eq(post_id))
        .order(reactions::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(found)))
}

#[derive(Debug, Deserialize)]
pub struct CreateReactionRequest {
    pub reaction: ReactionType,
}

async fn store(
    kind: SubjectKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CreateReactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reaction>>)> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    ensure_subject_exists(&mut conn, kind, post_id)?;

    let already: i64 = reactions::table
        .filter(reactions::subject_kind.eq(kind.to_string()))
        .filter(reactions::subject_id.eq(post_id))
        .filter(reactions::user_id.eq(principal.id))
        .count()
        .get_result(&mut conn)?;
    ensure_first_reaction(already)?;

    let reaction: Reaction = diesel::insert_into(reactions::table)
        .values(&NewReaction {
            subject_kind: kind.to_string(),
            subject_id: post_id,
            user_id: principal.id,
            reaction: req.reaction.to_string(),
        })
        .get_result(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reaction))))
}

async fn destroy(
    kind: SubjectKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let reaction: Reaction = reactions::table
        .find(id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ReactionNotFound, "reaction not found"))?;
    ensure_subject_scope(&reaction, kind)?;
    ensure_owner(&principal, reaction.user_id, ErrorCode::Forbidden)?;

    diesel::delete(reactions::table.find(id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::message("Reaction removed successfully")))
}

/// One reaction per user and subject, whatever its type.
fn ensure_first_reaction(existing: i64) -> AppResult<()> {
    if existing > 0 {
        return Err(AppError::new(ErrorCode::AlreadyReacted, "already reacted to this post"));
    }
    Ok(())
}

/// A reaction is only addressable through the nest of its own subject
/// family; a mismatched id behaves as if the reaction did not exist.
fn ensure_subject_scope(reaction: &Reaction, kind: SubjectKind) -> AppResult<()> {
    if reaction.subject_kind != kind.to_string() {
        return Err(AppError::new(ErrorCode::ReactionNotFound, "reaction not found"));
    }
    Ok(())
}

/// Resolve the tagged subject against its backing table.
pub fn ensure_subject_exists(
    conn: &mut PgConnection,
    kind: SubjectKind,
    id: Uuid,
) -> AppResult<()> {
    let count: i64 = match kind {
        SubjectKind::Inspire => inspire_posts::table
            .filter(inspire_posts::id.eq(id))
            .count()
            .get_result(conn)?,
        SubjectKind::ICan => ican_posts::table
            .filter(ican_posts::id.eq(id))
            .count()
            .get_result(conn)?,
        SubjectKind::INeed => ineed_posts::table
            .filter(ineed_posts::id.eq(id))
            .count()
            .get_result(conn)?,
    };

    if count == 0 {
        let code = match kind {
            SubjectKind::Inspire => ErrorCode::PostNotFound,
            SubjectKind::ICan | SubjectKind::INeed => ErrorCode::ListingNotFound,
        };
        return Err(AppError::new(code, format!("{kind} post not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn reaction_on(kind: SubjectKind) -> Reaction {
        Reaction {
            id: Uuid::now_v7(),
            subject_kind: kind.to_string(),
            subject_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            reaction: ReactionType::Like.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn second_reaction_is_rejected_with_400() {
        assert!(ensure_first_reaction(0).is_ok());

        let err = ensure_first_reaction(1).unwrap_err();
        match err {
            AppError::Known { code, .. } => {
                assert_eq!(code, ErrorCode::AlreadyReacted);
                assert_eq!(code.status_code(), StatusCode::BAD_REQUEST);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reaction_is_invisible_outside_its_subject_family() {
        let inspire_reaction = reaction_on(SubjectKind::Inspire);

        assert!(ensure_subject_scope(&inspire_reaction, SubjectKind::Inspire).is_ok());

        let err = ensure_subject_scope(&inspire_reaction, SubjectKind::ICan).unwrap_err();
        match err {
            AppError::Known { code, .. } => assert_eq!(code, ErrorCode::ReactionNotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
