//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::repositories::user::{
    NewUser, hash_password_blocking, verify_password_blocking,
};
use crate::db::{Store, User, WriteOutcome};
use crate::domain::UserStatus;
use crate::domain::user::is_valid_username;
use crate::services::auth_service::{AuthError, AuthService, MIN_PASSWORD_LENGTH, RegisterInput};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }

    fn ensure_active(user: &User) -> Result<(), AuthError> {
        match user.status {
            UserStatus::Active => Ok(()),
            UserStatus::Banned => Err(AuthError::Banned),
            UserStatus::Suspended => Err(AuthError::Suspended),
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        if !is_valid_username(&username) {
            return Err(AuthError::Validation(
                "Username must be 3-32 characters of letters, numbers, '_' or '-'".to_string(),
            ));
        }
        if !email.contains('@') || email.len() > 254 {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        Self::validate_password(&input.password)?;

        let password_hash = hash_password_blocking(input.password, self.security.clone()).await?;

        match self
            .store
            .users()
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await?
        {
            WriteOutcome::Written(user) => {
                info!(user_id = user.id, username = %user.username, "User registered");
                Ok(user)
            }
            WriteOutcome::Duplicate => Err(AuthError::AlreadyExists),
        }
    }

    async fn login(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some((user, password_hash)) = self.store.users().get_credentials(login).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(password.to_string(), password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        Self::ensure_active(&user)?;
        Ok(user)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        Self::validate_password(new_password)?;
        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let (_, password_hash) = self
            .store
            .users()
            .get_credentials(&user.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password_blocking(current_password.to_string(), password_hash).await? {
            return Err(AuthError::WrongPassword);
        }

        let new_hash =
            hash_password_blocking(new_password.to_string(), self.security.clone()).await?;
        self.store
            .users()
            .update_password_hash(user_id, new_hash)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }
}
