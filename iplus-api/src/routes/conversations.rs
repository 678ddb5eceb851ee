use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::ApiResponse;

use crate::extractors::Principal;
use crate::models::{Conversation, Message, NewConversation, NewMessage};
use crate::schema::{conversations, messages, users};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/:id/messages", get(list_messages).post(send_message))
}

#[derive(Debug, Serialize)]
pub struct ConversationView {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub last_message: Option<Message>,
}

async fn index(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mine: Vec<Conversation> = conversations::table
        .filter(
            conversations::user_one_id
                .eq(principal.id)
                .or(conversations::user_two_id.eq(principal.id)),
        )
        .order(conversations::updated_at.desc())
        .load(&mut conn)?;

    let mut views = Vec::with_capacity(mine.len());
    for conversation in mine {
        let last_message: Option<Message> = messages::table
            .filter(messages::conversation_id.eq(conversation.id))
            .order(messages::created_at.desc())
            .first(&mut conn)
            .optional()?;
        views.push(ConversationView { conversation, last_message });
    }

    Ok(Json(ApiResponse::ok(views)))
}

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub recipient_id: Uuid,
}

/// Opening a conversation is idempotent per unordered participant pair:
/// an existing (A,B) or (B,A) row comes back with 200, a fresh one with 201.
async fn store(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateConversationRequest>,
) -> AppResult<Response> {
    if req.recipient_id == principal.id {
        return Err(AppError::Validation("cannot open a conversation with yourself".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let recipient_exists: i64 = users::table
        .filter(users::id.eq(req.recipient_id))
        .count()
        .get_result(&mut conn)?;
    if recipient_exists == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "recipient not found"));
    }

    let mine: Vec<Conversation> = conversations::table
        .filter(
            conversations::user_one_id
                .eq(principal.id)
                .or(conversations::user_two_id.eq(principal.id)),
        )
        .load(&mut conn)?;

    let existing = mine
        .into_iter()
        .find(|c| c.is_between(principal.id, req.recipient_id));

    if let Some(conversation) = existing {
        return Ok(Json(ApiResponse::ok(conversation)).into_response());
    }

    let conversation: Conversation = diesel::insert_into(conversations::table)
        .values(&NewConversation {
            user_one_id: principal.id,
            user_two_id: req.recipient_id,
        })
        .get_result(&mut conn)?;

    tracing::info!(conversation_id = %conversation.id, "conversation created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(conversation))).into_response())
}

async fn list_messages(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let conversation = find_participating(&mut conn, id, principal.id)?;

    let found: Vec<Message> = messages::table
        .filter(messages::conversation_id.eq(conversation.id))
        .order(messages::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(found)))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

async fn send_message(
    Principal(principal): Principal,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Message>>)> {
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("message body must not be empty".into()));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let conversation = find_participating(&mut conn, id, principal.id)?;

    let message: Message = diesel::insert_into(messages::table)
        .values(&NewMessage {
            conversation_id: conversation.id,
            sender_id: principal.id,
            body: req.body,
        })
        .get_result(&mut conn)?;

    diesel::update(conversations::table.find(conversation.id))
        .set(conversations::updated_at.eq(chrono::Utc::now()))
        .execute(&mut conn)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

fn find_participating(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> AppResult<Conversation> {
    let conversation: Conversation = conversations::table
        .find(conversation_id)
        .first(conn)
        .map_err(|_| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    if !conversation.has_participant(user_id) {
        return Err(AppError::new(
            ErrorCode::NotConversationParticipant,
            "you are not part of this conversation",
        ));
    }

    Ok(conversation)
}
