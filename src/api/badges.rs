use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{parse_enum, validate_id, validate_text};
use super::{
    ApiError, ApiResponse, AppState, BadgeDto, CurrentUser, MessageResponse, UserBadgeDto,
};
use crate::db::repositories::badge::BadgeInput;
use crate::db::{NewNotification, WriteOutcome};
use crate::domain::{BadgeRarity, NotificationType};
use crate::entities::badges;
use crate::services::{Requirement, authorize};

const MAX_BADGE_NAME_LENGTH: usize = 50;
const MAX_BADGE_DESCRIPTION_LENGTH: usize = 500;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateBadgeRequest {
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateBadgeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AwardRequest {
    pub user_id: i32,
}

fn badge_name(raw: &str) -> Result<String, ApiError> {
    validate_text(raw, MAX_BADGE_NAME_LENGTH, "Badge name is required")
}

fn badge_description(raw: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(description) = raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_BADGE_DESCRIPTION_LENGTH {
        return Err(ApiError::validation(format!(
            "Description must be {MAX_BADGE_DESCRIPTION_LENGTH} characters or less"
        )));
    }
    Ok(Some(description))
}

fn saved(outcome: WriteOutcome<badges::Model>) -> Result<badges::Model, ApiError> {
    match outcome {
        WriteOutcome::Written(badge) => Ok(badge),
        WriteOutcome::Duplicate => Err(ApiError::validation("Badge name already exists")),
    }
}

async fn load_badge(state: &AppState, id: i32) -> Result<badges::Model, ApiError> {
    state
        .store()
        .badges()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Badge", id))
}

/// GET /badges
pub async fn list_badges(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BadgeDto>>>, ApiError> {
    let repo = state.store().badges();
    let counts = repo.award_counts().await?;

    let badges = repo
        .list()
        .await?
        .into_iter()
        .map(|badge| {
            let count = counts.get(&badge.id).copied().unwrap_or(0);
            BadgeDto {
                award_count: Some(count),
                ..BadgeDto::from(badge)
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(badges)))
}

/// GET /badges/{id}
pub async fn get_badge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BadgeDto>>, ApiError> {
    let id = validate_id(id, "badge")?;
    let badge = load_badge(&state, id).await?;
    Ok(Json(ApiResponse::success(badge.into())))
}

/// POST /badges
pub async fn create_badge(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreateBadgeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BadgeDto>>), ApiError> {
    authorize(&caller, Requirement::Admin)?;

    let input = BadgeInput {
        name: badge_name(&payload.name)?,
        description: badge_description(payload.description)?,
        icon_url: payload.icon_url.filter(|u| !u.trim().is_empty()),
        rarity: parse_enum::<BadgeRarity>(payload.rarity.as_deref())?
            .unwrap_or(BadgeRarity::Common),
    };

    let badge = saved(state.store().badges().create(input).await?)?;

    tracing::info!(badge_id = badge.id, name = %badge.name, "Badge created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(badge.into()))))
}

/// PUT /badges/{id}
pub async fn update_badge(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBadgeRequest>,
) -> Result<Json<ApiResponse<BadgeDto>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "badge")?;
    let existing = load_badge(&state, id).await?;

    let rarity = match parse_enum::<BadgeRarity>(payload.rarity.as_deref())? {
        Some(rarity) => rarity,
        None => existing.rarity.parse().unwrap_or(BadgeRarity::Common),
    };
    let input = BadgeInput {
        name: match payload.name {
            Some(name) => badge_name(&name)?,
            None => existing.name,
        },
        description: match payload.description {
            Some(description) => badge_description(Some(description))?,
            None => existing.description,
        },
        icon_url: match payload.icon_url {
            Some(url) => Some(url).filter(|u| !u.trim().is_empty()),
            None => existing.icon_url,
        },
        rarity,
    };

    let outcome = state
        .store()
        .badges()
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Badge", id))?;

    Ok(Json(ApiResponse::success(saved(outcome)?.into())))
}

/// DELETE /badges/{id}
pub async fn delete_badge(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "badge")?;

    if !state.store().badges().delete(id).await? {
        return Err(ApiError::not_found("Badge", id));
    }

    tracing::info!(badge_id = id, "Badge deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Badge deleted",
    ))))
}

/// POST /badges/{id}/award
pub async fn award_badge(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<AwardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserBadgeDto>>), ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "badge")?;
    let user_id = validate_id(payload.user_id, "user")?;

    let badge = load_badge(&state, id).await?;
    if !state.store().users().exists(user_id).await? {
        return Err(ApiError::not_found("User", user_id));
    }

    let notification = NewNotification {
        user_id,
        kind: NotificationType::Badge,
        title: "Badge earned".to_string(),
        message: format!("You earned the \"{}\" badge", badge.name),
        link: Some(format!("/profile/{user_id}")),
    };

    let award = match state
        .store()
        .badges()
        .award(id, user_id, caller.id, notification)
        .await?
    {
        WriteOutcome::Written(award) => award,
        WriteOutcome::Duplicate => {
            return Err(ApiError::validation("User already has this badge"));
        }
    };

    tracing::info!(badge_id = id, user_id, awarded_by = caller.id, "Badge awarded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserBadgeDto::from((award, badge)))),
    ))
}

/// DELETE /badges/{id}/award/{user_id}
pub async fn revoke_badge(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "badge")?;
    let user_id = validate_id(user_id, "user")?;

    if !state.store().badges().revoke(id, user_id).await? {
        return Err(ApiError::NotFound("Badge award not found".to_string()));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Badge revoked",
    ))))
}

/// GET /users/{id}/badges
pub async fn list_user_badges(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserBadgeDto>>>, ApiError> {
    let user_id = validate_id(user_id, "user")?;
    if !state.store().users().exists(user_id).await? {
        return Err(ApiError::not_found("User", user_id));
    }

    let badges = state
        .store()
        .badges()
        .for_user(user_id)
        .await?
        .into_iter()
        .map(UserBadgeDto::from)
        .collect();

    Ok(Json(ApiResponse::success(badges)))
}
