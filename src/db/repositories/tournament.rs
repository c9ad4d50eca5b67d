use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use std::collections::HashMap;

use super::{contains_pattern, fetch_page};
use crate::db::{is_unique_violation, now_timestamp};
use crate::domain::{PageParams, Paginated, TournamentFormat, TournamentStatus};
use crate::entities::{tournament_participants, tournaments, users};

#[derive(Debug, Clone, Default)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    pub format: Option<TournamentFormat>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTournament {
    pub title: String,
    pub description: Option<String>,
    pub game: String,
    pub format: TournamentFormat,
    pub max_participants: i32,
    pub prize_pool: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
    pub organizer_id: i32,
}

/// Fields of an edit. Dates arrive already validated and normalized.
#[derive(Debug, Clone, Default)]
pub struct TournamentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub game: Option<String>,
    pub format: Option<TournamentFormat>,
    pub max_participants: Option<i32>,
    pub prize_pool: Option<String>,
    pub status: Option<TournamentStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<Option<String>>,
    pub registration_deadline: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Capacity reached or registration closed between the check and the insert.
    Full,
    AlreadyRegistered,
}

#[derive(Debug, Clone)]
pub struct ParticipantRow {
    pub user_id: i32,
    pub username: String,
    pub joined_at: String,
}

/// Inserts only while the tournament is upcoming and below capacity, so the
/// count check and the insert are one statement.
const CONDITIONAL_JOIN_SQL: &str = "INSERT INTO tournament_participants (tournament_id, user_id, joined_at) \
     SELECT ?, ?, ? \
     WHERE (SELECT COUNT(*) FROM tournament_participants WHERE tournament_id = ?) \
         < (SELECT max_participants FROM tournaments WHERE id = ? AND status = 'upcoming')";

pub struct TournamentRepository {
    conn: DatabaseConnection,
}

impl TournamentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        filter: &TournamentFilter,
        params: PageParams,
    ) -> Result<Paginated<tournaments::Model>> {
        let mut query = tournaments::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(tournaments::Column::Status.eq(status.as_str()));
        }
        if let Some(format) = filter.format {
            query = query.filter(tournaments::Column::Format.eq(format.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(tournaments::Column::Title.like(contains_pattern(search)))
                    .add(tournaments::Column::Game.like(contains_pattern(search))),
            );
        }

        fetch_page(
            &self.conn,
            query
                .order_by_asc(tournaments::Column::StartDate)
                .order_by_asc(tournaments::Column::Id),
            params,
        )
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<tournaments::Model>> {
        tournaments::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query tournament")
    }

    pub async fn participant_count(&self, id: i32) -> Result<u64> {
        tournament_participants::Entity::find()
            .filter(tournament_participants::Column::TournamentId.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to count participants")
    }

    pub async fn participant_counts(&self, ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = tournament_participants::Entity::find()
            .select_only()
            .column(tournament_participants::Column::TournamentId)
            .column_as(tournament_participants::Column::Id.count(), "count")
            .filter(tournament_participants::Column::TournamentId.is_in(ids.iter().copied()))
            .group_by(tournament_participants::Column::TournamentId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count participants")?;

        Ok(rows.into_iter().collect())
    }

    pub async fn participants(&self, id: i32) -> Result<Vec<ParticipantRow>> {
        let rows = tournament_participants::Entity::find()
            .filter(tournament_participants::Column::TournamentId.eq(id))
            .find_also_related(users::Entity)
            .order_by_asc(tournament_participants::Column::JoinedAt)
            .order_by_asc(tournament_participants::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query participants")?;

        Ok(rows
            .into_iter()
            .map(|(p, user)| ParticipantRow {
                user_id: p.user_id,
                username: user.map(|u| u.username).unwrap_or_default(),
                joined_at: p.joined_at,
            })
            .collect())
    }

    pub async fn is_registered(&self, id: i32, user_id: i32) -> Result<bool> {
        let count = tournament_participants::Entity::find()
            .filter(tournament_participants::Column::TournamentId.eq(id))
            .filter(tournament_participants::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to query registration")?;
        Ok(count > 0)
    }

    pub async fn create(&self, new: NewTournament) -> Result<tournaments::Model> {
        let now = now_timestamp();
        tournaments::ActiveModel {
            title: Set(new.title),
            description: Set(new.description),
            game: Set(new.game),
            format: Set(new.format.as_str().to_string()),
            max_participants: Set(new.max_participants),
            prize_pool: Set(new.prize_pool),
            status: Set(TournamentStatus::Upcoming.as_str().to_string()),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            registration_deadline: Set(new.registration_deadline),
            organizer_id: Set(new.organizer_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert tournament")
    }

    pub async fn update(
        &self,
        id: i32,
        update: TournamentUpdate,
    ) -> Result<Option<tournaments::Model>> {
        let Some(tournament) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: tournaments::ActiveModel = tournament.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(game) = update.game {
            active.game = Set(game);
        }
        if let Some(format) = update.format {
            active.format = Set(format.as_str().to_string());
        }
        if let Some(max_participants) = update.max_participants {
            active.max_participants = Set(max_participants);
        }
        if let Some(prize_pool) = update.prize_pool {
            active.prize_pool = Set(Some(prize_pool).filter(|p| !p.trim().is_empty()));
        }
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(start_date) = update.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = update.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(deadline) = update.registration_deadline {
            active.registration_deadline = Set(deadline);
        }
        active.updated_at = Set(now_timestamp());

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Removes the registrations first, then the tournament.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        tournament_participants::Entity::delete_many()
            .filter(tournament_participants::Column::TournamentId.eq(id))
            .exec(&txn)
            .await?;
        let result = tournaments::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Registers `user_id` if capacity allows. Capacity is enforced by the
    /// conditional insert and duplicates by the unique (tournament, user) index.
    pub async fn try_join(&self, id: i32, user_id: i32) -> Result<JoinOutcome> {
        let txn = self.conn.begin().await?;
        let backend = txn.get_database_backend();

        let result = txn
            .execute(Statement::from_sql_and_values(
                backend,
                CONDITIONAL_JOIN_SQL,
                [
                    id.into(),
                    user_id.into(),
                    now_timestamp().into(),
                    id.into(),
                    id.into(),
                ],
            ))
            .await;

        let outcome = match result {
            Ok(result) if result.rows_affected() == 0 => JoinOutcome::Full,
            Ok(_) => JoinOutcome::Joined,
            Err(e) if is_unique_violation(&e) => JoinOutcome::AlreadyRegistered,
            Err(e) => return Err(e).context("Failed to register participant"),
        };

        if outcome == JoinOutcome::Joined {
            txn.commit().await?;
        } else {
            txn.rollback().await?;
        }

        Ok(outcome)
    }

    pub async fn leave(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = tournament_participants::Entity::delete_many()
            .filter(tournament_participants::Column::TournamentId.eq(id))
            .filter(tournament_participants::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove participant")?;
        Ok(result.rows_affected > 0)
    }
}
