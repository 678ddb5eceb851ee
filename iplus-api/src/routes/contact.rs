use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use iplus_shared::errors::{AppError, AppResult};
use iplus_shared::types::ApiResponse;

use crate::models::{ContactMessage, NewContactMessage};
use crate::schema::contact_messages;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/send", post(send))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

async fn send(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let saved: ContactMessage = diesel::insert_into(contact_messages::table)
        .values(&NewContactMessage {
            name: req.name,
            email: req.email,
            body: req.message,
        })
        .get_result(&mut conn)?;

    // Forwarding is best-effort; the message is already persisted.
    if let Err(e) = state
        .email
        .forward_contact_message(&state.config.support_email, &saved.name, &saved.email, &saved.body)
        .await
    {
        tracing::warn!(error = %e, "failed to forward contact message");
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Message sent successfully")),
    ))
}
