use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{
    Listing, ListingKind, ListingRequest, NewListingRequest, RequestStatus, User,
};
use crate::routes::listings::find_listing;
use crate::schema::{listing_requests, users};
use crate::services::authz::ensure_owner;
use crate::AppState;

/// Request routes for one listing kind, nested under `/{kind}/requests`.
pub fn routes(kind: ListingKind) -> Router<Arc<AppState>> {
    let (index_h, apply_h, accept_h, reject_h, member_h) = match kind {
        ListingKind::ICan => (
            get(index_ican),
            post(apply_ican),
            post(accept_ican),
            post(reject_ican),
            get(for_listing_ican).delete(withdraw_ican),
        ),
        ListingKind::INeed => (
            get(index_ineed),
            post(apply_ineed),
            post(accept_ineed),
            post(reject_ineed),
            get(for_listing_ineed).delete(withdraw_ineed),
        ),
    };

    Router::new()
        .route("/", index_h)
        .route("/apply", apply_h)
        .route("/:id/accept", accept_h)
        .route("/:id/reject", reject_h)
        // GET takes a listing id, DELETE a request id.
        .route("/:id", member_h)
}

macro_rules! kind_wrappers {
    ($kind:expr, $index:ident, $apply:ident, $accept:ident, $reject:ident, $for_listing:ident, $withdraw:ident) => {
        async fn $index(
            principal: Principal,
            state: State<Arc<AppState>>,
        ) -> AppResult<Json<ApiResponse<Vec<RequestView>>>> {
            index($kind, principal, state).await
        }

        async fn $apply(
            principal: Principal,
            state: State<Arc<AppState>>,
            body: Json<ApplyRequest>,
        ) -> AppResult<(StatusCode, Json<ApiResponse<ListingRequest>>)> {
            apply($kind, principal, state, body).await
        }

        async fn $accept(
            principal: Principal,
            state: State<Arc<AppState>>,
            path: Path<Uuid>,
        ) -> AppResult<Json<ApiResponse<ListingRequest>>> {
            transition($kind, RequestStatus::Accepted, principal, state, path).await
        }

        async fn $reject(
            principal: Principal,
            state: State<Arc<AppState>>,
            path: Path<Uuid>,
        ) -> AppResult<Json<ApiResponse<ListingRequest>>> {
            transition($kind, RequestStatus::Rejected, principal, state, path).await
        }

        async fn $for_listing(
            principal: Principal,
            state: State<Arc<AppState>>,
            path: Path<Uuid>,
        ) -> AppResult<Json<ApiResponse<Vec<RequestView>>>> {
            for_listing($kind, principal, state, path).await
        }

        async fn $withdraw(
            principal: Principal,
            state: State<Arc<AppState>>,
            path: Path<Uuid>,
        ) -> AppResult<Json<ApiResponse<()>>> {
            withdraw($kind, principal, state, path).await
        }
    };
}

kind_wrappers!(
    ListingKind::ICan,
    index_ican,
    apply_ican,
    accept_ican,
    reject_ican,
    for_listing_ican,
    withdraw_ican
);
kind_wrappers!(
    ListingKind::INeed,
    index_ineed,
    apply_ineed,
    accept_ineed,
    reject_ineed,
    for_listing_ineed,
    withdraw_ineed
);

#[derive(Debug, Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: ListingRequest,
    pub listing: Listing,
    pub applicant: ApplicantSummary,
}

#[derive(Debug, Serialize)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
}

impl From<&User> for ApplicantSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

async fn index(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<RequestView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<(ListingRequest, User)> = listing_requests::table
        .inner_join(users::table)
        .filter(listing_requests::listing_kind.eq(kind.to_string()))
        .filter(listing_requests::user_id.eq(principal.id))
        .order(listing_requests::created_at.desc())
        .load(&mut conn)?;

    let views = assemble_views(&mut conn, kind, rows)?;
    Ok(Json(ApiResponse::ok(views)))
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub listing_id: Uuid,
}

async fn apply(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApplyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ListingRequest>>)> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    find_listing(&mut conn, kind, req.listing_id)?;

    let already: i64 = listing_requests::table
        .filter(listing_requests::listing_kind.eq(kind.to_string()))
        .filter(listing_requests::listing_id.eq(req.listing_id))
        .filter(listing_requests::user_id.eq(principal.id))
        .count()
        .get_result(&mut conn)?;
    ensure_first_application(already)?;

    let request: ListingRequest = diesel::insert_into(listing_requests::table)
        .values(&NewListingRequest {
            listing_kind: kind.to_string(),
            listing_id: req.listing_id,
            user_id: principal.id,
            status: RequestStatus::Pending.to_string(),
        })
        .get_result(&mut conn)?;

    tracing::info!(request_id = %request.id, listing_id = %req.listing_id, %kind, "listing request created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(request))))
}

/// Accept or reject. Only the listing owner may decide, and only while the
/// request is still pending.
async fn transition(
    kind: ListingKind,
    to: RequestStatus,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingRequest>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let request = find_request(&mut conn, kind, id)?;
    let listing = find_listing(&mut conn, kind, request.listing_id)?;
    ensure_owner(&principal, listing.user_id, ErrorCode::NotListingOwner)?;

    let current = RequestStatus::from_str(&request.status).map_err(AppError::internal)?;
    if current.is_terminal() {
        return Err(AppError::new(
            ErrorCode::BadRequest,
            format!("request has already been {current}"),
        ));
    }

    let request: ListingRequest = diesel::update(listing_requests::table.find(id))
        .set((
            listing_requests::status.eq(to.to_string()),
            listing_requests::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)?;

    tracing::info!(request_id = %id, status = %to, "listing request resolved");

    Ok(Json(ApiResponse::ok(request)))
}

async fn for_listing(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<RequestView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let listing = find_listing(&mut conn, kind, listing_id)?;
    ensure_owner(&principal, listing.user_id, ErrorCode::NotListingOwner)?;

    let rows: Vec<(ListingRequest, User)> = listing_requests::table
        .inner_join(users::table)
        .filter(listing_requests::listing_kind.eq(kind.to_string()))
        .filter(listing_requests::listing_id.eq(listing_id))
        .order(listing_requests::created_at.desc())
        .load(&mut conn)?;

    let views = assemble_views(&mut conn, kind, rows)?;
    Ok(Json(ApiResponse::ok(views)))
}

async fn withdraw(
    kind: ListingKind,
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let request = find_request(&mut conn, kind, id)?;
    ensure_owner(&principal, request.user_id, ErrorCode::Forbidden)?;

    diesel::delete(listing_requests::table.find(id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::message("Request withdrawn successfully")))
}

/// One open or resolved application per user and listing.
fn ensure_first_application(existing: i64) -> AppResult<()> {
    if existing > 0 {
        return Err(AppError::new(ErrorCode::AlreadyApplied, "already applied to this listing"));
    }
    Ok(())
}

fn find_request(
    conn: &mut PgConnection,
    kind: ListingKind,
    id: Uuid,
) -> AppResult<ListingRequest> {
    let found: Option<ListingRequest> = listing_requests::table
        .find(id)
        .filter(listing_requests::listing_kind.eq(kind.to_string()))
        .first(conn)
        .optional()?;
    found.ok_or_else(|| AppError::new(ErrorCode::RequestNotFound, "request not found"))
}

fn assemble_views(
    conn: &mut PgConnection,
    kind: ListingKind,
    rows: Vec<(ListingRequest, User)>,
) -> AppResult<Vec<RequestView>> {
    let mut views = Vec::with_capacity(rows.len());
    for (request, applicant) in rows {
        let listing = find_listing(conn, kind, request.listing_id)?;
        views.push(RequestView {
            applicant: ApplicantSummary::from(&applicant),
            listing,
            request,
        });
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn second_application_is_rejected_with_400() {
        assert!(ensure_first_application(0).is_ok());

        let err = ensure_first_application(1).unwrap_err();
        match err {
            AppError::Known { code, .. } => {
                assert_eq!(code, ErrorCode::AlreadyApplied);
                assert_eq!(code.status_code(), StatusCode::BAD_REQUEST);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
