//! Tournament creation, editing and the registration workflow.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::tournament::{JoinRejection, ScheduleError};
use crate::domain::{TournamentFormat, TournamentStatus};
use crate::entities::tournaments;

#[derive(Debug, Clone, Default)]
pub struct CreateTournamentInput {
    pub title: String,
    pub description: Option<String>,
    pub game: String,
    pub format: Option<TournamentFormat>,
    pub max_participants: Option<i32>,
    pub prize_pool: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
}

/// Partial edit. For the optional dates an empty string clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTournamentInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub game: Option<String>,
    pub format: Option<TournamentFormat>,
    pub max_participants: Option<i32>,
    pub prize_pool: Option<String>,
    pub status: Option<TournamentStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationAction {
    Join,
    Leave,
}

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Join(#[from] JoinRejection),

    #[error("Not registered for this tournament")]
    NotRegistered,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TournamentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TournamentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait TournamentService: Send + Sync {
    /// Creates an upcoming tournament organized by `organizer_id`.
    async fn create(
        &self,
        organizer_id: i32,
        input: CreateTournamentInput,
    ) -> Result<tournaments::Model, TournamentError>;

    /// Applies a partial edit. Status changes have no side effects.
    async fn update(
        &self,
        id: i32,
        input: UpdateTournamentInput,
    ) -> Result<tournaments::Model, TournamentError>;

    /// Registers or unregisters `user_id`; returns the new participant count.
    async fn register(
        &self,
        id: i32,
        user_id: i32,
        action: RegistrationAction,
    ) -> Result<u64, TournamentError>;
}
