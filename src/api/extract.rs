//! Session-backed caller identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState};
use crate::db::User;
use crate::domain::UserStatus;

/// Session key holding the signed-in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

/// The signed-in, active account. Rejects with 401 when there is no session
/// and 403 when the account is banned or suspended.
pub struct CurrentUser(pub User);

/// The signed-in account if there is one and it is active.
pub struct MaybeUser(pub Option<User>);

async fn session_user(parts: &mut Parts, state: &Arc<AppState>) -> Result<Option<User>, ApiError> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| ApiError::internal(format!("Session error: {msg}")))?;

    let Some(user_id) = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
    else {
        return Ok(None);
    };

    let user = state.store().users().get_by_id(user_id).await?;
    if let Some(user) = &user {
        tracing::Span::current().record("user_id", user.id);
    }

    Ok(user)
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = session_user(parts, state)
            .await?
            .ok_or_else(ApiError::unauthorized)?;

        match user.status {
            UserStatus::Active => Ok(Self(user)),
            UserStatus::Banned => Err(ApiError::forbidden("Account is banned")),
            UserStatus::Suspended => Err(ApiError::forbidden("Account is suspended")),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = session_user(parts, state)
            .await?
            .filter(|user| user.status == UserStatus::Active);
        Ok(Self(user))
    }
}
