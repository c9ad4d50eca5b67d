use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use std::collections::HashMap;
use tokio::task;

use super::{contains_pattern, fetch_page};
use crate::config::SecurityConfig;
use crate::db::{WriteOutcome, is_unique_violation, now_timestamp};
use crate::domain::user::level_for_xp;
use crate::domain::{PageParams, Paginated, Role, UserStatus};
use crate::entities::{
    clan_members, clans, cms_content, forum_comments, forum_likes, forum_posts, messages,
    notifications, tournament_participants, tournaments, user_badges, users,
};

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub points: i32,
    pub wins: i32,
    pub losses: i32,
    pub xp: i32,
    pub level: i32,
    pub must_change_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        // Unknown stored values fall back to the least privileged variant.
        let role = model.role.parse().unwrap_or(Role::User);
        let status = model.status.parse().unwrap_or(UserStatus::Active);
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            bio: model.bio,
            role,
            status,
            points: model.points,
            wins: model.wins,
            losses: model.losses,
            xp: model.xp,
            level: model.level,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile fields; `None` leaves a field untouched, an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsUpdate {
    pub points: Option<i32>,
    pub wins: Option<i32>,
    pub losses: Option<i32>,
    pub xp: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteUserOutcome {
    Deleted,
    NotFound,
    OwnsClan,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Looks up a login name (username or email) together with its password hash.
    pub async fn get_credentials(&self, login: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(login))
                    .add(users::Column::Email.eq(login.to_lowercase())),
            )
            .one(&self.conn)
            .await
            .context("Failed to query user credentials")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    /// Maps user ids to usernames; unknown ids are omitted.
    pub async fn usernames_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, String)> = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Username)
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query usernames")?;

        Ok(rows.into_iter().collect())
    }

    pub async fn list(&self, filter: &UserFilter, params: PageParams) -> Result<Paginated<User>> {
        let mut query = users::Entity::find();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Username.like(contains_pattern(search)))
                    .add(users::Column::DisplayName.like(contains_pattern(search))),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(role.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(users::Column::Status.eq(status.as_str()));
        }

        let page = fetch_page(
            &self.conn,
            query.order_by_asc(users::Column::Username),
            params,
        )
        .await?;

        Ok(page.map(User::from))
    }

    /// Inserts a new account; a taken username or email yields `Duplicate`.
    pub async fn create(&self, new_user: NewUser) -> Result<WriteOutcome<User>> {
        let now = now_timestamp();
        let model = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email.to_lowercase()),
            password_hash: Set(new_user.password_hash),
            role: Set(Role::User.as_str().to_string()),
            status: Set(UserStatus::Active.as_str().to_string()),
            points: Set(0),
            wins: Set(0),
            losses: Set(0),
            xp: Set(0),
            level: Set(1),
            must_change_password: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.conn).await {
            Ok(model) => Ok(WriteOutcome::Written(User::from(model))),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    /// Stores a new hash and clears the forced-rotation flag.
    pub async fn update_password_hash(&self, id: i32, password_hash: String) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.must_change_password = Set(false);
        active.updated_at = Set(now_timestamp());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(display_name) = update.display_name {
            active.display_name = Set(non_empty(display_name));
        }
        if let Some(avatar_url) = update.avatar_url {
            active.avatar_url = Set(non_empty(avatar_url));
        }
        if let Some(bio) = update.bio {
            active.bio = Set(non_empty(bio));
        }
        active.updated_at = Set(now_timestamp());

        let model = active.update(&self.conn).await?;
        Ok(Some(User::from(model)))
    }

    pub async fn set_role(&self, id: i32, role: Role) -> Result<Option<User>> {
        self.set_column(id, users::Column::Role, role.as_str()).await
    }

    pub async fn set_status(&self, id: i32, status: UserStatus) -> Result<Option<User>> {
        self.set_column(id, users::Column::Status, status.as_str())
            .await
    }

    async fn set_column(
        &self,
        id: i32,
        column: users::Column,
        value: &str,
    ) -> Result<Option<User>> {
        let result = users::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update user")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Applies ranking stats; the level is recomputed from xp.
    pub async fn update_stats(&self, id: i32, stats: StatsUpdate) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for stats update")?
        else {
            return Ok(None);
        };

        let xp = stats.xp.unwrap_or(user.xp);
        let mut active: users::ActiveModel = user.into();
        if let Some(points) = stats.points {
            active.points = Set(points);
        }
        if let Some(wins) = stats.wins {
            active.wins = Set(wins);
        }
        if let Some(losses) = stats.losses {
            active.losses = Set(losses);
        }
        active.xp = Set(xp);
        active.level = Set(level_for_xp(xp));
        active.updated_at = Set(now_timestamp());

        let model = active.update(&self.conn).await?;
        Ok(Some(User::from(model)))
    }

    /// Deletes an account and everything that references it in one
    /// transaction. Tournaments the user organized are handed to `successor_id`.
    pub async fn delete(&self, id: i32, successor_id: i32) -> Result<DeleteUserOutcome> {
        let txn = self.conn.begin().await?;

        if users::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(DeleteUserOutcome::NotFound);
        }

        let owns_clan = clans::Entity::find()
            .filter(clans::Column::OwnerId.eq(id))
            .one(&txn)
            .await?
            .is_some();
        if owns_clan {
            return Ok(DeleteUserOutcome::OwnsClan);
        }

        let authored_posts: Vec<i32> = forum_posts::Entity::find()
            .select_only()
            .column(forum_posts::Column::Id)
            .filter(forum_posts::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        forum_likes::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(forum_likes::Column::UserId.eq(id))
                    .add(forum_likes::Column::PostId.is_in(authored_posts.iter().copied())),
            )
            .exec(&txn)
            .await?;
        forum_comments::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(forum_comments::Column::AuthorId.eq(id))
                    .add(forum_comments::Column::PostId.is_in(authored_posts.iter().copied())),
            )
            .exec(&txn)
            .await?;
        forum_posts::Entity::delete_many()
            .filter(forum_posts::Column::AuthorId.eq(id))
            .exec(&txn)
            .await?;

        clan_members::Entity::delete_many()
            .filter(clan_members::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        tournament_participants::Entity::delete_many()
            .filter(tournament_participants::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        tournaments::Entity::update_many()
            .col_expr(tournaments::Column::OrganizerId, Expr::value(successor_id))
            .filter(tournaments::Column::OrganizerId.eq(id))
            .exec(&txn)
            .await?;
        user_badges::Entity::delete_many()
            .filter(user_badges::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        user_badges::Entity::update_many()
            .col_expr(user_badges::Column::AwardedBy, Expr::value(Option::<i32>::None))
            .filter(user_badges::Column::AwardedBy.eq(id))
            .exec(&txn)
            .await?;
        notifications::Entity::delete_many()
            .filter(notifications::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        messages::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(messages::Column::SenderId.eq(id))
                    .add(messages::Column::RecipientId.eq(id)),
            )
            .exec(&txn)
            .await?;
        cms_content::Entity::update_many()
            .col_expr(cms_content::Column::UpdatedBy, Expr::value(Option::<i32>::None))
            .filter(cms_content::Column::UpdatedBy.eq(id))
            .exec(&txn)
            .await?;

        users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(DeleteUserOutcome::Deleted)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Hashes on the blocking pool; Argon2 would otherwise stall the runtime.
pub async fn hash_password_blocking(password: String, config: SecurityConfig) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Verifies on the blocking pool. The parameters are read from the stored hash.
pub async fn verify_password_blocking(password: String, password_hash: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}
