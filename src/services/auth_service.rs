//! Account registration, login and password rotation.

use crate::db::User;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is banned")]
    Banned,

    #[error("Account is suspended")]
    Suspended,

    #[error("Username or email already in use")]
    AlreadyExists,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a regular account.
    async fn register(&self, input: RegisterInput) -> Result<User, AuthError>;

    /// Checks credentials; `login` is a username or an email address.
    async fn login(&self, login: &str, password: &str) -> Result<User, AuthError>;

    /// Rotates the password after verifying the current one.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
