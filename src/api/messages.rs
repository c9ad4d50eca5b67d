use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{MAX_MESSAGE_LENGTH, page_params, validate_id, validate_text};
use super::{
    ApiError, ApiResponse, AppState, CountResponse, CurrentUser, MessageDto, MessageResponse,
};
use crate::db::NewNotification;
use crate::domain::pagination::PageQuery;
use crate::domain::{NotificationType, Paginated};
use crate::entities::messages;
use crate::services::policy::Forbidden;

/// Length of the message excerpt carried by the recipient's notification.
const PREVIEW_LENGTH: usize = 80;

#[derive(Deserialize, Default)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SendMessageRequest {
    pub recipient_id: i32,
    pub content: String,
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_LENGTH).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

async fn load_message(state: &AppState, id: i32) -> Result<messages::Model, ApiError> {
    state
        .store()
        .messages()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message", id))
}

/// GET /messages
pub async fn list_inbox(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<ApiResponse<Paginated<MessageDto>>>, ApiError> {
    let params = page_params(page, &state.config().community);
    let messages = state
        .store()
        .messages()
        .inbox(caller.id, query.unread, params)
        .await?;

    Ok(Json(ApiResponse::success(messages.map(MessageDto::from))))
}

/// GET /messages/sent
pub async fn list_sent(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<MessageDto>>>, ApiError> {
    let params = page_params(page, &state.config().community);
    let messages = state.store().messages().sent(caller.id, params).await?;

    Ok(Json(ApiResponse::success(messages.map(MessageDto::from))))
}

/// GET /messages/conversation/{user_id}
///
/// Both directions, oldest first.
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<i32>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<MessageDto>>>, ApiError> {
    let user_id = validate_id(user_id, "user")?;
    let params = page_params(page, &state.config().community);

    let messages = state
        .store()
        .messages()
        .conversation(caller.id, user_id, params)
        .await?;

    Ok(Json(ApiResponse::success(messages.map(MessageDto::from))))
}

/// POST /messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageDto>>), ApiError> {
    let recipient_id = validate_id(payload.recipient_id, "recipient")?;
    if recipient_id == caller.id {
        return Err(ApiError::validation(
            "You cannot send a message to yourself",
        ));
    }
    let content = validate_text(
        &payload.content,
        MAX_MESSAGE_LENGTH,
        "Message content is required",
    )?;

    if !state.store().users().exists(recipient_id).await? {
        return Err(ApiError::not_found("User", recipient_id));
    }

    let notification = NewNotification {
        user_id: recipient_id,
        kind: NotificationType::Message,
        title: format!("New message from {}", caller.username),
        message: preview(&content),
        link: Some(format!("/messages/{}", caller.id)),
    };

    let message = state
        .store()
        .messages()
        .send(caller.id, recipient_id, content, notification)
        .await?;

    tracing::info!(
        message_id = message.id,
        sender_id = caller.id,
        recipient_id,
        "Message sent"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageDto::from(message))),
    ))
}

/// PATCH /messages/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let id = validate_id(id, "message")?;
    let mut message = load_message(&state, id).await?;
    if message.recipient_id != caller.id {
        return Err(Forbidden.into());
    }

    state.store().messages().mark_read(id).await?;
    message.is_read = true;

    Ok(Json(ApiResponse::success(MessageDto::from(message))))
}

/// DELETE /messages/{id}
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "message")?;
    let message = load_message(&state, id).await?;
    if message.sender_id != caller.id && message.recipient_id != caller.id {
        return Err(Forbidden.into());
    }

    state.store().messages().delete(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Message deleted",
    ))))
}

/// GET /messages/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.store().messages().unread_count(caller.id).await?;
    Ok(Json(ApiResponse::success(CountResponse { count })))
}
