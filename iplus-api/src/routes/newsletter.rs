use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::models::{NewNewsletterSubscription, NewsletterSubscription};
use crate::schema::newsletter_subscriptions;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/unsubscribe", post(unsubscribe))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email)]
    pub email: String,
    pub list: Option<String>,
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubscribeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<NewsletterSubscription>>)> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let already: i64 = newsletter_subscriptions::table
        .filter(newsletter_subscriptions::email.eq(&req.email))
        .count()
        .get_result(&mut conn)?;
    if already > 0 {
        return Err(AppError::new(ErrorCode::AlreadySubscribed, "email already subscribed"));
    }

    let subscription: NewsletterSubscription =
        diesel::insert_into(newsletter_subscriptions::table)
            .values(&NewNewsletterSubscription {
                email: req.email,
                list: req.list.unwrap_or_else(|| "general".to_string()),
            })
            .get_result(&mut conn)?;

    tracing::info!(email = %subscription.email, "newsletter subscription added");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(subscription))))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnsubscribeRequest {
    #[validate(email)]
    pub email: String,
}

async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UnsubscribeRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(
        newsletter_subscriptions::table.filter(newsletter_subscriptions::email.eq(&req.email)),
    )
    .execute(&mut conn)?;

    if removed == 0 {
        return Err(AppError::new(
            ErrorCode::SubscriptionNotFound,
            "email is not subscribed",
        ));
    }

    Ok(Json(ApiResponse::message("Unsubscribed successfully")))
}
