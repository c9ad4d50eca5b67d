//! `SeaORM` implementation of the `ClanService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::repositories::clan::{ClanUpdate, CreateClanOutcome, NewClan};
use crate::db::{Store, User, WriteOutcome};
use crate::domain::clan::{is_valid_clan_name, normalize_tag};
use crate::domain::{ClanRole, Role};
use crate::entities::clans;
use crate::services::clan_service::{ClanError, ClanService, CreateClanInput, UpdateClanInput};

pub struct SeaOrmClanService {
    store: Store,
}

impl SeaOrmClanService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn validate_name(name: &str) -> Result<String, ClanError> {
        if is_valid_clan_name(name) {
            Ok(name.trim().to_string())
        } else {
            Err(ClanError::Validation(
                "Clan name must be 3-50 characters".to_string(),
            ))
        }
    }

    fn validate_tag(tag: &str) -> Result<String, ClanError> {
        normalize_tag(tag).ok_or_else(|| {
            ClanError::Validation("Clan tag must be 2-6 letters or digits".to_string())
        })
    }

    async fn load(&self, id: i32) -> Result<clans::Model, ClanError> {
        self.store
            .clans()
            .get(id)
            .await?
            .ok_or(ClanError::NotFound(id))
    }

    /// Role of `user_id` in `clan_id`, if they are a member of that clan.
    async fn role_in(&self, clan_id: i32, user_id: i32) -> Result<Option<ClanRole>, ClanError> {
        Ok(self
            .store
            .clans()
            .membership_of(user_id)
            .await?
            .filter(|m| m.clan_id == clan_id)
            .map(|m| m.role.parse().unwrap_or(ClanRole::Member)))
    }
}

#[async_trait]
impl ClanService for SeaOrmClanService {
    async fn create(
        &self,
        owner_id: i32,
        input: CreateClanInput,
    ) -> Result<clans::Model, ClanError> {
        let name = Self::validate_name(&input.name)?;
        let tag = Self::validate_tag(&input.tag)?;

        let outcome = self
            .store
            .clans()
            .create(NewClan {
                name,
                tag,
                description: input.description.filter(|d| !d.trim().is_empty()),
                logo_url: input.logo_url.filter(|l| !l.trim().is_empty()),
                owner_id,
            })
            .await?;

        match outcome {
            CreateClanOutcome::Created(clan) => {
                info!(clan_id = clan.id, owner_id, tag = %clan.tag, "Clan created");
                Ok(clan)
            }
            CreateClanOutcome::AlreadyInClan => Err(ClanError::AlreadyInClan),
            CreateClanOutcome::NameTaken => Err(ClanError::NameTaken),
        }
    }

    async fn update(&self, id: i32, input: UpdateClanInput) -> Result<clans::Model, ClanError> {
        let name = input.name.as_deref().map(Self::validate_name).transpose()?;
        let tag = input.tag.as_deref().map(Self::validate_tag).transpose()?;

        let outcome = self
            .store
            .clans()
            .update(
                id,
                ClanUpdate {
                    name,
                    tag,
                    description: input.description,
                    logo_url: input.logo_url,
                },
            )
            .await?
            .ok_or(ClanError::NotFound(id))?;

        match outcome {
            WriteOutcome::Written(clan) => Ok(clan),
            WriteOutcome::Duplicate => Err(ClanError::NameTaken),
        }
    }

    async fn join(&self, clan_id: i32, user_id: i32) -> Result<(), ClanError> {
        self.load(clan_id).await?;

        match self.store.clans().join(clan_id, user_id).await? {
            WriteOutcome::Written(()) => {
                info!(clan_id, user_id, "Clan member joined");
                Ok(())
            }
            WriteOutcome::Duplicate => Err(ClanError::AlreadyInClan),
        }
    }

    async fn leave(&self, clan_id: i32, user_id: i32) -> Result<(), ClanError> {
        let clan = self.load(clan_id).await?;
        if clan.owner_id == user_id {
            return Err(ClanError::OwnerCannotLeave);
        }

        if !self.store.clans().remove_member(clan_id, user_id).await? {
            return Err(ClanError::NotMember);
        }

        info!(clan_id, user_id, "Clan member left");
        Ok(())
    }

    async fn kick(&self, actor: &User, clan_id: i32, user_id: i32) -> Result<(), ClanError> {
        let clan = self.load(clan_id).await?;
        if clan.owner_id == user_id {
            return Err(ClanError::Validation(
                "The clan owner cannot be removed".to_string(),
            ));
        }

        let target_role = self
            .role_in(clan_id, user_id)
            .await?
            .ok_or(ClanError::NotMember)?;

        if actor.role != Role::Admin {
            let actor_role = self
                .role_in(clan_id, actor.id)
                .await?
                .ok_or(ClanError::Forbidden)?;
            // Leaders may only remove regular members.
            if !actor_role.can_kick() || actor_role <= target_role {
                return Err(ClanError::Forbidden);
            }
        }

        self.store.clans().remove_member(clan_id, user_id).await?;
        info!(clan_id, user_id, by = actor.id, "Clan member removed");
        Ok(())
    }

    async fn set_member_role(
        &self,
        actor: &User,
        clan_id: i32,
        user_id: i32,
        role: ClanRole,
    ) -> Result<(), ClanError> {
        let clan = self.load(clan_id).await?;

        if clan.owner_id != actor.id && actor.role != Role::Admin {
            return Err(ClanError::Forbidden);
        }
        if role == ClanRole::Owner || clan.owner_id == user_id {
            return Err(ClanError::Validation(
                "Clan ownership cannot be changed here".to_string(),
            ));
        }

        if !self
            .store
            .clans()
            .set_member_role(clan_id, user_id, role)
            .await?
        {
            return Err(ClanError::NotMember);
        }

        info!(clan_id, user_id, role = %role, "Clan member role changed");
        Ok(())
    }
}
