//! Clan membership rules: creation, joining, leaving and member management.

use thiserror::Error;

use crate::db::User;
use crate::domain::ClanRole;
use crate::entities::clans;

#[derive(Debug, Clone, Default)]
pub struct CreateClanInput {
    pub name: String,
    pub tag: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateClanInput {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClanError {
    #[error("Clan {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Validation(String),

    #[error("You are already in a clan")]
    AlreadyInClan,

    #[error("Clan name or tag already exists")]
    NameTaken,

    #[error("Clan owner cannot leave the clan")]
    OwnerCannotLeave,

    #[error("User is not a member of this clan")]
    NotMember,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ClanError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ClanError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ClanService: Send + Sync {
    /// Creates a clan owned by `owner_id`.
    async fn create(&self, owner_id: i32, input: CreateClanInput)
    -> Result<clans::Model, ClanError>;

    /// Edits name, tag, description or logo.
    async fn update(&self, id: i32, input: UpdateClanInput) -> Result<clans::Model, ClanError>;

    async fn join(&self, clan_id: i32, user_id: i32) -> Result<(), ClanError>;

    async fn leave(&self, clan_id: i32, user_id: i32) -> Result<(), ClanError>;

    /// Removes `user_id` from the clan on behalf of `actor`.
    async fn kick(&self, actor: &User, clan_id: i32, user_id: i32) -> Result<(), ClanError>;

    /// Promotes or demotes a member. Only the owner (or an admin) may do this.
    async fn set_member_role(
        &self,
        actor: &User,
        clan_id: i32,
        user_id: i32,
        role: ClanRole,
    ) -> Result<(), ClanError>;
}
