use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{
    ApiError, ApiResponse, AppState, CurrentUser, CurrentUserDto, MessageResponse,
    SESSION_USER_KEY,
};
use crate::db::User;
use crate::services::{AuthError, RegisterInput};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Banned | AuthError::Suspended => Self::forbidden(err.to_string()),
            AuthError::AlreadyExists | AuthError::WrongPassword => Self::validation(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::Database(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// Binds `user` to a fresh session id.
async fn start_session(session: &Session, user: &User) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    tracing::Span::current().record("user_id", user.id);
    Ok(())
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CurrentUserDto>>), ApiError> {
    let user = state
        .auth_service()
        .register(RegisterInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    start_session(&session, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CurrentUserDto::from(user))),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<CurrentUserDto>>, ApiError> {
    let user = match state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(err) => {
            tracing::info!(login = %payload.username.trim(), reason = %err, "Login rejected");
            return Err(err.into());
        }
    };

    start_session(&session, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(ApiResponse::success(CurrentUserDto::from(user))))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse::new("Logged out"))))
}

/// GET /auth/me
pub async fn get_current_user(
    CurrentUser(user): CurrentUser,
) -> Json<ApiResponse<CurrentUserDto>> {
    Json(ApiResponse::success(CurrentUserDto::from(user)))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}
