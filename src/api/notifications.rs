use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    MAX_MESSAGE_LENGTH, MAX_TITLE_LENGTH, page_params, parse_enum, validate_id, validate_text,
};
use super::{
    ApiError, ApiResponse, AppState, CountResponse, CurrentUser, MessageResponse,
    NotificationDto,
};
use crate::db::NewNotification;
use crate::domain::pagination::PageQuery;
use crate::domain::{NotificationType, Paginated};
use crate::entities::notifications;
use crate::services::policy::Forbidden;
use crate::services::{Requirement, authorize};

const NOTIFICATION_REQUIRED: &str = "Title and message are required";

#[derive(Deserialize, Default)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateNotificationRequest {
    pub user_id: i32,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Loads a notification owned by `user_id`.
async fn load_owned(
    state: &AppState,
    id: i32,
    user_id: i32,
) -> Result<notifications::Model, ApiError> {
    let notification = state
        .store()
        .notifications()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification", id))?;

    if notification.user_id != user_id {
        return Err(Forbidden.into());
    }
    Ok(notification)
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<Paginated<NotificationDto>>>, ApiError> {
    let params = page_params(page, &state.config().community);
    let notifications = state
        .store()
        .notifications()
        .list(caller.id, query.unread, params)
        .await?;

    Ok(Json(ApiResponse::success(
        notifications.map(NotificationDto::from),
    )))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.store().notifications().unread_count(caller.id).await?;
    Ok(Json(ApiResponse::success(CountResponse { count })))
}

/// PATCH /notifications/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let id = validate_id(id, "notification")?;
    let mut notification = load_owned(&state, id, caller.id).await?;

    state.store().notifications().mark_read(id).await?;
    notification.is_read = true;

    Ok(Json(ApiResponse::success(NotificationDto::from(
        notification,
    ))))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.store().notifications().mark_all_read(caller.id).await?;
    Ok(Json(ApiResponse::success(CountResponse { count })))
}

/// DELETE /notifications/{id}
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "notification")?;
    load_owned(&state, id, caller.id).await?;

    state.store().notifications().delete(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Notification deleted",
    ))))
}

/// POST /notifications
///
/// Admin broadcast to a single user.
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationDto>>), ApiError> {
    authorize(&caller, Requirement::Admin)?;

    let user_id = validate_id(payload.user_id, "user")?;
    let kind = parse_enum::<NotificationType>(payload.kind.as_deref())?
        .unwrap_or(NotificationType::System);
    let title = validate_text(&payload.title, MAX_TITLE_LENGTH, NOTIFICATION_REQUIRED)?;
    let message = validate_text(&payload.message, MAX_MESSAGE_LENGTH, NOTIFICATION_REQUIRED)?;

    if !state.store().users().exists(user_id).await? {
        return Err(ApiError::not_found("User", user_id));
    }

    let notification = state
        .store()
        .notifications()
        .create(NewNotification {
            user_id,
            kind,
            title,
            message,
            link: payload.link.filter(|l| !l.trim().is_empty()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(NotificationDto::from(notification))),
    ))
}
