use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{page_params, parse_enum, validate_id, validate_search_query};
use super::{
    ApiError, ApiResponse, AppState, ClanDetailDto, ClanDto, ClanMemberDto, CurrentUser,
    MessageResponse,
};
use crate::domain::pagination::PageQuery;
use crate::domain::{ClanRole, Paginated};
use crate::entities::clans;
use crate::services::clan_service::UpdateClanInput;
use crate::services::{ClanError, CreateClanInput, Requirement, authorize};

#[derive(Deserialize, Default)]
pub struct ClanListQuery {
    pub search: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateClanRequest {
    pub name: String,
    pub tag: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateClanRequest {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct MemberRoleRequest {
    pub role: String,
}

impl From<ClanError> for ApiError {
    fn from(err: ClanError) -> Self {
        match err {
            ClanError::NotFound(id) => Self::not_found("Clan", id),
            ClanError::Validation(msg) => Self::validation(msg),
            ClanError::AlreadyInClan
            | ClanError::NameTaken
            | ClanError::OwnerCannotLeave
            | ClanError::NotMember => Self::validation(err.to_string()),
            ClanError::Forbidden => Self::forbidden(err.to_string()),
            ClanError::Database(msg) => Self::Database(msg),
            ClanError::Internal(msg) => Self::internal(msg),
        }
    }
}

async fn load_clan(state: &AppState, id: i32) -> Result<clans::Model, ApiError> {
    state
        .store()
        .clans()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Clan", id))
}

async fn member_count(state: &AppState, id: i32) -> Result<i64, ApiError> {
    let counts = state.store().clans().member_counts(&[id]).await?;
    Ok(counts.get(&id).copied().unwrap_or(0))
}

/// GET /clans
pub async fn list_clans(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ClanListQuery>,
) -> Result<Json<ApiResponse<Paginated<ClanDto>>>, ApiError> {
    let search = validate_search_query(query.search.as_deref())?;
    let params = page_params(page, &state.config().community);

    let repo = state.store().clans();
    let clans = repo.list(search.as_deref(), params).await?;

    let ids: Vec<i32> = clans.items.iter().map(|c| c.id).collect();
    let counts = repo.member_counts(&ids).await?;

    Ok(Json(ApiResponse::success(clans.map(|clan| {
        let count = counts.get(&clan.id).copied().unwrap_or(0);
        ClanDto::new(clan, count)
    }))))
}

/// GET /clans/{id}
pub async fn get_clan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ClanDetailDto>>, ApiError> {
    let id = validate_id(id, "clan")?;
    let clan = load_clan(&state, id).await?;

    let members: Vec<ClanMemberDto> = state
        .store()
        .clans()
        .members(id)
        .await?
        .into_iter()
        .map(ClanMemberDto::from)
        .collect();
    let count = i64::try_from(members.len()).unwrap_or(i64::MAX);

    Ok(Json(ApiResponse::success(ClanDetailDto {
        clan: ClanDto::new(clan, count),
        members,
    })))
}

/// POST /clans
pub async fn create_clan(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreateClanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClanDto>>), ApiError> {
    let clan = state
        .clan_service()
        .create(
            caller.id,
            CreateClanInput {
                name: payload.name,
                tag: payload.tag,
                description: payload.description,
                logo_url: payload.logo_url,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ClanDto::new(clan, 1))),
    ))
}

/// PUT /clans/{id}
pub async fn update_clan(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateClanRequest>,
) -> Result<Json<ApiResponse<ClanDto>>, ApiError> {
    let id = validate_id(id, "clan")?;
    let existing = load_clan(&state, id).await?;
    authorize(&caller, Requirement::SelfOrAdmin(existing.owner_id))?;

    let clan = state
        .clan_service()
        .update(
            id,
            UpdateClanInput {
                name: payload.name,
                tag: payload.tag,
                description: payload.description,
                logo_url: payload.logo_url,
            },
        )
        .await?;
    let count = member_count(&state, id).await?;

    Ok(Json(ApiResponse::success(ClanDto::new(clan, count))))
}

/// DELETE /clans/{id}
pub async fn delete_clan(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "clan")?;
    let existing = load_clan(&state, id).await?;
    authorize(&caller, Requirement::SelfOrAdmin(existing.owner_id))?;

    if !state.store().clans().delete(id).await? {
        return Err(ApiError::not_found("Clan", id));
    }

    tracing::info!(clan_id = id, deleted_by = caller.id, "Clan deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new("Clan deleted"))))
}

/// POST /clans/{id}/join
pub async fn join_clan(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "clan")?;
    state.clan_service().join(id, caller.id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new("Joined clan"))))
}

/// POST /clans/{id}/leave
pub async fn leave_clan(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "clan")?;
    state.clan_service().leave(id, caller.id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new("Left clan"))))
}

/// PATCH /clans/{id}/members/{user_id}
pub async fn set_member_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path((id, user_id)): Path<(i32, i32)>,
    Json(payload): Json<MemberRoleRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "clan")?;
    let user_id = validate_id(user_id, "user")?;
    let role = parse_enum::<ClanRole>(Some(payload.role.as_str()))?
        .ok_or_else(|| ApiError::validation("Role is required"))?;

    state
        .clan_service()
        .set_member_role(&caller, id, user_id, role)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Member role updated",
    ))))
}

/// DELETE /clans/{id}/members/{user_id}
pub async fn kick_member(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "clan")?;
    let user_id = validate_id(user_id, "user")?;

    state.clan_service().kick(&caller, id, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Member removed",
    ))))
}
