use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{page_params, parse_enum, validate_id, validate_search_query};
use super::{
    ApiError, ApiResponse, AppState, CurrentUser, MaybeUser, MessageResponse, ParticipantDto,
    RegistrationResponse, TournamentDetailDto, TournamentDto,
};
use crate::db::repositories::tournament::TournamentFilter;
use crate::domain::pagination::PageQuery;
use crate::domain::{Paginated, TournamentFormat, TournamentStatus};
use crate::entities::tournaments;
use crate::services::{
    CreateTournamentInput, RegistrationAction, Requirement, TournamentError,
    UpdateTournamentInput, authorize,
};

#[derive(Deserialize, Default)]
pub struct TournamentListQuery {
    pub status: Option<String>,
    pub format: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateTournamentRequest {
    pub title: String,
    pub description: Option<String>,
    pub game: String,
    pub format: Option<String>,
    pub max_participants: Option<i32>,
    pub prize_pool: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateTournamentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub game: Option<String>,
    pub format: Option<String>,
    pub max_participants: Option<i32>,
    pub prize_pool: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegistrationRequest {
    pub action: String,
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        match err {
            TournamentError::NotFound(id) => Self::not_found("Tournament", id),
            TournamentError::Validation(msg) => Self::validation(msg),
            TournamentError::Schedule(_)
            | TournamentError::Join(_)
            | TournamentError::NotRegistered => Self::validation(err.to_string()),
            TournamentError::Database(msg) => Self::Database(msg),
            TournamentError::Internal(msg) => Self::internal(msg),
        }
    }
}

fn parse_action(raw: &str) -> Result<RegistrationAction, ApiError> {
    match raw.trim() {
        "join" => Ok(RegistrationAction::Join),
        "leave" => Ok(RegistrationAction::Leave),
        _ => Err(ApiError::validation("Invalid action")),
    }
}

async fn load_tournament(state: &AppState, id: i32) -> Result<tournaments::Model, ApiError> {
    state
        .store()
        .tournaments()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament", id))
}

/// GET /tournaments
pub async fn list_tournaments(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(query): Query<TournamentListQuery>,
) -> Result<Json<ApiResponse<Paginated<TournamentDto>>>, ApiError> {
    let filter = TournamentFilter {
        status: parse_enum::<TournamentStatus>(query.status.as_deref())?,
        format: parse_enum::<TournamentFormat>(query.format.as_deref())?,
        search: validate_search_query(query.search.as_deref())?,
    };
    let params = page_params(page, &state.config().community);

    let repo = state.store().tournaments();
    let tournaments = repo.list(&filter, params).await?;

    let ids: Vec<i32> = tournaments.items.iter().map(|t| t.id).collect();
    let counts = repo.participant_counts(&ids).await?;

    Ok(Json(ApiResponse::success(tournaments.map(|t| {
        let count = counts.get(&t.id).copied().unwrap_or(0);
        TournamentDto::new(t, count)
    }))))
}

/// GET /tournaments/{id}
pub async fn get_tournament(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TournamentDetailDto>>, ApiError> {
    let id = validate_id(id, "tournament")?;
    let tournament = load_tournament(&state, id).await?;

    let repo = state.store().tournaments();
    let participants: Vec<ParticipantDto> = repo
        .participants(id)
        .await?
        .into_iter()
        .map(ParticipantDto::from)
        .collect();

    let is_registered = viewer
        .as_ref()
        .is_some_and(|v| participants.iter().any(|p| p.user_id == v.id));
    let count = i64::try_from(participants.len()).unwrap_or(i64::MAX);

    Ok(Json(ApiResponse::success(TournamentDetailDto {
        tournament: TournamentDto::new(tournament, count),
        participants,
        is_registered,
    })))
}

/// POST /tournaments
pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TournamentDto>>), ApiError> {
    authorize(&caller, Requirement::Moderator)?;

    let input = CreateTournamentInput {
        format: parse_enum::<TournamentFormat>(payload.format.as_deref())?,
        title: payload.title,
        description: payload.description,
        game: payload.game,
        max_participants: payload.max_participants,
        prize_pool: payload.prize_pool,
        start_date: payload.start_date,
        end_date: payload.end_date,
        registration_deadline: payload.registration_deadline,
    };

    let tournament = state
        .tournament_service()
        .create(caller.id, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TournamentDto::new(tournament, 0))),
    ))
}

/// PUT /tournaments/{id}
///
/// Organizer or admin. Also used to move the status along.
pub async fn update_tournament(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTournamentRequest>,
) -> Result<Json<ApiResponse<TournamentDto>>, ApiError> {
    let id = validate_id(id, "tournament")?;
    let existing = load_tournament(&state, id).await?;
    authorize(&caller, Requirement::SelfOrAdmin(existing.organizer_id))?;

    let input = UpdateTournamentInput {
        format: parse_enum::<TournamentFormat>(payload.format.as_deref())?,
        status: parse_enum::<TournamentStatus>(payload.status.as_deref())?,
        title: payload.title,
        description: payload.description,
        game: payload.game,
        max_participants: payload.max_participants,
        prize_pool: payload.prize_pool,
        start_date: payload.start_date,
        end_date: payload.end_date,
        registration_deadline: payload.registration_deadline,
    };

    let tournament = state.tournament_service().update(id, input).await?;
    let count = state.store().tournaments().participant_count(id).await?;

    Ok(Json(ApiResponse::success(TournamentDto::new(
        tournament,
        i64::try_from(count).unwrap_or(i64::MAX),
    ))))
}

/// DELETE /tournaments/{id}
pub async fn delete_tournament(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "tournament")?;
    let existing = load_tournament(&state, id).await?;
    authorize(&caller, Requirement::SelfOrAdmin(existing.organizer_id))?;

    if !state.store().tournaments().delete(id).await? {
        return Err(ApiError::not_found("Tournament", id));
    }

    tracing::info!(tournament_id = id, deleted_by = caller.id, "Tournament deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Tournament deleted",
    ))))
}

/// POST /tournaments/{id}
///
/// Body `{"action": "join" | "leave"}`.
pub async fn register(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<Json<ApiResponse<RegistrationResponse>>, ApiError> {
    let id = validate_id(id, "tournament")?;
    let action = parse_action(&payload.action)?;

    let participant_count = state
        .tournament_service()
        .register(id, caller.id, action)
        .await?;

    Ok(Json(ApiResponse::success(RegistrationResponse {
        registered: action == RegistrationAction::Join,
        participant_count,
    })))
}
