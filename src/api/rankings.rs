use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IntoDeserializer, value::StrDeserializer};
use std::sync::Arc;

use super::validation::{page_params, validate_id, validate_non_negative};
use super::{
    ApiError, ApiResponse, AppState, ClanDto, CurrentUser, RankedClanDto, RankedUserDto, UserDto,
};
use crate::db::repositories::ranking::{ClanRankingSort, UserRankingSort};
use crate::db::repositories::user::StatsUpdate;
use crate::domain::pagination::PageQuery;
use crate::domain::Paginated;
use crate::services::{Requirement, authorize};

#[derive(Deserialize, Default)]
pub struct RankingQuery {
    pub sort: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UserStatsRequest {
    pub points: Option<i32>,
    pub wins: Option<i32>,
    pub losses: Option<i32>,
    pub xp: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct ClanStatsRequest {
    pub points: Option<i32>,
    pub wins: Option<i32>,
    pub losses: Option<i32>,
}

/// Reads a sort key through the enum's serde spelling; absent means default.
fn parse_sort<T: DeserializeOwned + Default>(raw: Option<&str>) -> Result<T, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(T::default());
    };

    let deserializer: StrDeserializer<'_, serde::de::value::Error> = raw.into_deserializer();
    T::deserialize(deserializer).map_err(|_| ApiError::validation(format!("Invalid sort: {raw}")))
}

/// GET /rankings/users
pub async fn user_rankings(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Paginated<RankedUserDto>>>, ApiError> {
    let sort: UserRankingSort = parse_sort(query.sort.as_deref())?;
    let params = page_params(page, &state.config().community);

    let users = state.store().rankings().users(sort, params).await?;

    let mut rank = params.offset();
    Ok(Json(ApiResponse::success(users.map(|user| {
        rank += 1;
        RankedUserDto::new(rank, user)
    }))))
}

/// GET /rankings/clans
pub async fn clan_rankings(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Paginated<RankedClanDto>>>, ApiError> {
    let sort: ClanRankingSort = parse_sort(query.sort.as_deref())?;
    let params = page_params(page, &state.config().community);

    let clans = state.store().rankings().clans(sort, params).await?;

    let mut rank = params.offset();
    Ok(Json(ApiResponse::success(clans.map(|clan| {
        rank += 1;
        RankedClanDto::new(rank, clan)
    }))))
}

/// PUT /rankings/users/{id}
///
/// The level follows from xp.
pub async fn update_user_stats(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UserStatsRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "user")?;

    let stats = StatsUpdate {
        points: validate_non_negative(payload.points, "Points")?,
        wins: validate_non_negative(payload.wins, "Wins")?,
        losses: validate_non_negative(payload.losses, "Losses")?,
        xp: validate_non_negative(payload.xp, "XP")?,
    };

    let user = state
        .store()
        .users()
        .update_stats(id, stats)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    tracing::info!(user_id = id, updated_by = caller.id, "User stats updated");
    Ok(Json(ApiResponse::success(UserDto::new(user, true))))
}

/// PUT /rankings/clans/{id}
pub async fn update_clan_stats(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ClanStatsRequest>,
) -> Result<Json<ApiResponse<ClanDto>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let id = validate_id(id, "clan")?;

    let clans = state.store().clans();
    let clan = clans
        .update_stats(
            id,
            validate_non_negative(payload.points, "Points")?,
            validate_non_negative(payload.wins, "Wins")?,
            validate_non_negative(payload.losses, "Losses")?,
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Clan", id))?;
    let count = clans.member_counts(&[id]).await?.get(&id).copied().unwrap_or(0);

    tracing::info!(clan_id = id, updated_by = caller.id, "Clan stats updated");
    Ok(Json(ApiResponse::success(ClanDto::new(clan, count))))
}
