use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{page_params, parse_enum, validate_id, validate_search_query};
use super::{
    ApiError, ApiResponse, AppState, CurrentUser, MaybeUser, MessageResponse, UserBadgeDto,
    UserClanDto, UserDto, UserProfileDto,
};
use crate::db::repositories::user::{DeleteUserOutcome, ProfileUpdate, UserFilter};
use crate::domain::pagination::PageQuery;
use crate::domain::{ClanRole, Paginated, Role, UserStatus};
use crate::services::{Requirement, authorize};

const MAX_DISPLAY_NAME_LENGTH: usize = 50;
const MAX_BIO_LENGTH: usize = 500;
const MAX_URL_LENGTH: usize = 500;

#[derive(Deserialize, Default)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct StatusRequest {
    pub status: String,
}

fn check_length(value: Option<&String>, max: usize, field: &str) -> Result<(), ApiError> {
    if let Some(value) = value
        && value.trim().chars().count() > max
    {
        return Err(ApiError::validation(format!(
            "{field} must be {max} characters or less"
        )));
    }
    Ok(())
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Paginated<UserDto>>>, ApiError> {
    let filter = UserFilter {
        search: validate_search_query(query.search.as_deref())?,
        role: parse_enum::<Role>(query.role.as_deref())?,
        status: parse_enum::<UserStatus>(query.status.as_deref())?,
    };
    let params = page_params(page, &state.config().community);

    let show_email = viewer.is_some_and(|v| v.role == Role::Admin);
    let users = state.store().users().list(&filter, params).await?;

    Ok(Json(ApiResponse::success(
        users.map(|user| UserDto::new(user, show_email)),
    )))
}

/// GET /users/{id}
///
/// Profile with the user's clan and badges.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserProfileDto>>, ApiError> {
    let id = validate_id(id, "user")?;
    let store = state.store();

    let user = store
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let clan = match store.clans().membership_of(id).await? {
        Some(membership) => store.clans().get(membership.clan_id).await?.map(|clan| {
            UserClanDto {
                id: clan.id,
                name: clan.name,
                tag: clan.tag,
                role: membership.role.parse().unwrap_or(ClanRole::Member),
            }
        }),
        None => None,
    };

    let badges = store
        .badges()
        .for_user(id)
        .await?
        .into_iter()
        .map(UserBadgeDto::from)
        .collect();

    let show_email = viewer.is_some_and(|v| v.id == id || v.role == Role::Admin);

    Ok(Json(ApiResponse::success(UserProfileDto {
        user: UserDto::new(user, show_email),
        clan,
        badges,
    })))
}

/// PUT /users/{id}
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id(id, "user")?;
    authorize(&caller, Requirement::SelfOrAdmin(id))?;

    check_length(payload.display_name.as_ref(), MAX_DISPLAY_NAME_LENGTH, "Display name")?;
    check_length(payload.avatar_url.as_ref(), MAX_URL_LENGTH, "Avatar URL")?;
    check_length(payload.bio.as_ref(), MAX_BIO_LENGTH, "Bio")?;

    let user = state
        .store()
        .users()
        .update_profile(
            id,
            ProfileUpdate {
                display_name: payload.display_name,
                avatar_url: payload.avatar_url,
                bio: payload.bio,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    Ok(Json(ApiResponse::success(UserDto::new(user, true))))
}

/// PATCH /users/{id}/role
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "user")?;
    let role = parse_enum::<Role>(Some(payload.role.as_str()))?
        .ok_or_else(|| ApiError::validation("Role is required"))?;

    if id == caller.id && role != Role::Admin {
        return Err(ApiError::validation("You cannot remove your own admin role"));
    }

    let user = state
        .store()
        .users()
        .set_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    tracing::info!(user_id = id, role = %role, changed_by = caller.id, "User role changed");
    Ok(Json(ApiResponse::success(UserDto::new(user, true))))
}

/// PATCH /users/{id}/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "user")?;
    let status = parse_enum::<UserStatus>(Some(payload.status.as_str()))?
        .ok_or_else(|| ApiError::validation("Status is required"))?;

    if id == caller.id && status != UserStatus::Active {
        return Err(ApiError::validation("You cannot ban or suspend yourself"));
    }

    let user = state
        .store()
        .users()
        .set_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    tracing::info!(user_id = id, status = %status, changed_by = caller.id, "User status changed");
    Ok(Json(ApiResponse::success(UserDto::new(user, true))))
}

/// DELETE /users/{id}
///
/// Tournaments the user organized are handed over to the deleting admin.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "user")?;

    if id == caller.id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    match state.store().users().delete(id, caller.id).await? {
        DeleteUserOutcome::Deleted => {
            tracing::info!(user_id = id, deleted_by = caller.id, "User deleted");
            Ok(Json(ApiResponse::success(MessageResponse::new(
                "User deleted",
            ))))
        }
        DeleteUserOutcome::NotFound => Err(ApiError::not_found("User", id)),
        DeleteUserOutcome::OwnsClan => Err(ApiError::validation("User owns a clan")),
    }
}
