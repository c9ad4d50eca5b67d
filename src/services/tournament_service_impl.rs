//! `SeaORM` implementation of the `TournamentService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::config::CommunityConfig;
use crate::db::Store;
use crate::db::repositories::tournament::{JoinOutcome, NewTournament, TournamentUpdate};
use crate::domain::{TournamentFormat, TournamentStatus};
use crate::domain::tournament::{
    JoinRejection, JoinSnapshot, MAX_PARTICIPANTS, MIN_PARTICIPANTS, Schedule, check_join,
    parse_timestamp,
};
use crate::entities::tournaments;
use crate::services::tournament_service::{
    CreateTournamentInput, RegistrationAction, TournamentError, TournamentService,
    UpdateTournamentInput,
};

pub struct SeaOrmTournamentService {
    store: Store,
    community: CommunityConfig,
}

impl SeaOrmTournamentService {
    #[must_use]
    pub const fn new(store: Store, community: CommunityConfig) -> Self {
        Self { store, community }
    }

    fn validate_capacity(max_participants: i32) -> Result<(), TournamentError> {
        if (MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&max_participants) {
            Ok(())
        } else {
            Err(TournamentError::Validation(format!(
                "Max participants must be between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS}"
            )))
        }
    }

    async fn load(&self, id: i32) -> Result<tournaments::Model, TournamentError> {
        self.store
            .tournaments()
            .get(id)
            .await?
            .ok_or(TournamentError::NotFound(id))
    }

    async fn join(&self, tournament: &tournaments::Model, user_id: i32) -> Result<(), TournamentError> {
        let repo = self.store.tournaments();

        let snapshot = JoinSnapshot {
            status: tournament
                .status
                .parse()
                .unwrap_or(TournamentStatus::Cancelled),
            registration_deadline: tournament
                .registration_deadline
                .as_deref()
                .and_then(parse_timestamp),
            participant_count: repo.participant_count(tournament.id).await?,
            max_participants: tournament.max_participants,
            already_registered: repo.is_registered(tournament.id, user_id).await?,
        };
        check_join(&snapshot, Utc::now())?;

        match repo.try_join(tournament.id, user_id).await? {
            JoinOutcome::Joined => {
                info!(tournament_id = tournament.id, user_id, "Participant registered");
                Ok(())
            }
            JoinOutcome::Full => Err(JoinRejection::Full.into()),
            JoinOutcome::AlreadyRegistered => Err(JoinRejection::AlreadyRegistered.into()),
        }
    }
}

fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(required)
}

#[async_trait]
impl TournamentService for SeaOrmTournamentService {
    async fn create(
        &self,
        organizer_id: i32,
        input: CreateTournamentInput,
    ) -> Result<tournaments::Model, TournamentError> {
        let (Some(title), Some(game)) = (required(&input.title), required(&input.game)) else {
            return Err(TournamentError::Validation(
                "Title and game are required".to_string(),
            ));
        };

        let max_participants = input
            .max_participants
            .unwrap_or(self.community.default_max_participants);
        Self::validate_capacity(max_participants)?;

        let schedule = Schedule::parse(
            &input.start_date,
            input.end_date.as_deref(),
            input.registration_deadline.as_deref(),
            Utc::now(),
            true,
        )?;

        let tournament = self
            .store
            .tournaments()
            .create(NewTournament {
                title,
                description: optional(input.description),
                game,
                format: input.format.unwrap_or(TournamentFormat::SingleElimination),
                max_participants,
                prize_pool: optional(input.prize_pool),
                start_date: schedule.start.to_rfc3339(),
                end_date: schedule.end.map(|d| d.to_rfc3339()),
                registration_deadline: schedule.registration_deadline.map(|d| d.to_rfc3339()),
                organizer_id,
            })
            .await?;

        info!(tournament_id = tournament.id, organizer_id, "Tournament created");
        Ok(tournament)
    }

    async fn update(
        &self,
        id: i32,
        input: UpdateTournamentInput,
    ) -> Result<tournaments::Model, TournamentError> {
        let current = self.load(id).await?;
        let repo = self.store.tournaments();

        let title = match input.title {
            Some(title) => Some(required(&title).ok_or_else(|| {
                TournamentError::Validation("Title and game are required".to_string())
            })?),
            None => None,
        };
        let game = match input.game {
            Some(game) => Some(required(&game).ok_or_else(|| {
                TournamentError::Validation("Title and game are required".to_string())
            })?),
            None => None,
        };

        if let Some(max_participants) = input.max_participants {
            Self::validate_capacity(max_participants)?;
            let registered = repo.participant_count(id).await?;
            if u64::try_from(max_participants).unwrap_or(0) < registered {
                return Err(TournamentError::Validation(
                    "Max participants cannot be below the current participant count".to_string(),
                ));
            }
        }

        let dates_changed = input.start_date.is_some()
            || input.end_date.is_some()
            || input.registration_deadline.is_some();

        let mut update = TournamentUpdate {
            title,
            description: input.description,
            game,
            format: input.format,
            max_participants: input.max_participants,
            prize_pool: input.prize_pool,
            status: input.status,
            ..TournamentUpdate::default()
        };

        if dates_changed {
            let start = input.start_date.as_deref().unwrap_or(&current.start_date);
            let end = input
                .end_date
                .as_deref()
                .or(current.end_date.as_deref());
            let deadline = input
                .registration_deadline
                .as_deref()
                .or(current.registration_deadline.as_deref());

            let status = input
                .status
                .or_else(|| current.status.parse().ok())
                .unwrap_or(TournamentStatus::Upcoming);
            let require_future_start =
                input.start_date.is_some() && status == TournamentStatus::Upcoming;

            let schedule = Schedule::parse(start, end, deadline, Utc::now(), require_future_start)?;

            update.start_date = Some(schedule.start.to_rfc3339());
            update.end_date = Some(schedule.end.map(|d| d.to_rfc3339()));
            update.registration_deadline =
                Some(schedule.registration_deadline.map(|d| d.to_rfc3339()));
        }

        let updated = repo
            .update(id, update)
            .await?
            .ok_or(TournamentError::NotFound(id))?;

        if updated.status != current.status {
            info!(
                tournament_id = id,
                from = %current.status,
                to = %updated.status,
                "Tournament status changed"
            );
        }

        Ok(updated)
    }

    async fn register(
        &self,
        id: i32,
        user_id: i32,
        action: RegistrationAction,
    ) -> Result<u64, TournamentError> {
        let tournament = self.load(id).await?;
        let repo = self.store.tournaments();

        match action {
            RegistrationAction::Join => self.join(&tournament, user_id).await?,
            RegistrationAction::Leave => {
                if !repo.leave(id, user_id).await? {
                    return Err(TournamentError::NotRegistered);
                }
                info!(tournament_id = id, user_id, "Participant left");
            }
        }

        Ok(repo.participant_count(id).await?)
    }
}
