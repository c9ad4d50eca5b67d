use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;

use super::{contains_pattern, fetch_page};
use crate::db::{WriteOutcome, is_unique_violation, now_timestamp};
use crate::domain::{ClanRole, PageParams, Paginated};
use crate::entities::{clan_members, clans, users};

#[derive(Debug, Clone)]
pub struct NewClan {
    pub name: String,
    pub tag: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ClanUpdate {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateClanOutcome {
    Created(clans::Model),
    AlreadyInClan,
    NameTaken,
}

#[derive(Debug, Clone)]
pub struct MemberRow {
    pub user_id: i32,
    pub username: String,
    pub role: ClanRole,
    pub joined_at: String,
}

pub struct ClanRepository {
    conn: DatabaseConnection,
}

impl ClanRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        params: PageParams,
    ) -> Result<Paginated<clans::Model>> {
        let mut query = clans::Entity::find();
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(clans::Column::Name.like(contains_pattern(search)))
                    .add(clans::Column::Tag.like(contains_pattern(&search.to_uppercase()))),
            );
        }

        fetch_page(&self.conn, query.order_by_asc(clans::Column::Name), params).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<clans::Model>> {
        clans::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query clan")
    }

    pub async fn member_counts(&self, clan_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if clan_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = clan_members::Entity::find()
            .select_only()
            .column(clan_members::Column::ClanId)
            .column_as(clan_members::Column::Id.count(), "count")
            .filter(clan_members::Column::ClanId.is_in(clan_ids.iter().copied()))
            .group_by(clan_members::Column::ClanId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count clan members")?;

        Ok(rows.into_iter().collect())
    }

    /// Members with their usernames, owner first then by join date.
    pub async fn members(&self, clan_id: i32) -> Result<Vec<MemberRow>> {
        let rows = clan_members::Entity::find()
            .filter(clan_members::Column::ClanId.eq(clan_id))
            .find_also_related(users::Entity)
            .order_by_asc(clan_members::Column::JoinedAt)
            .all(&self.conn)
            .await
            .context("Failed to query clan members")?;

        let mut members: Vec<MemberRow> = rows
            .into_iter()
            .map(|(member, user)| MemberRow {
                user_id: member.user_id,
                username: user.map(|u| u.username).unwrap_or_default(),
                role: member.role.parse().unwrap_or(ClanRole::Member),
                joined_at: member.joined_at,
            })
            .collect();
        members.sort_by_key(|m| std::cmp::Reverse(m.role));

        Ok(members)
    }

    pub async fn membership_of(&self, user_id: i32) -> Result<Option<clan_members::Model>> {
        clan_members::Entity::find()
            .filter(clan_members::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query clan membership")
    }

    pub async fn owns_clan(&self, user_id: i32) -> Result<bool> {
        let count = clans::Entity::find()
            .filter(clans::Column::OwnerId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to query owned clans")?;
        Ok(count > 0)
    }

    /// Creates the clan and its owner membership in one transaction. The unique
    /// indexes on name, tag and `clan_members.user_id` decide concurrent requests.
    pub async fn create(&self, new_clan: NewClan) -> Result<CreateClanOutcome> {
        let txn = self.conn.begin().await?;
        let now = now_timestamp();
        let owner_id = new_clan.owner_id;

        let already_member = clan_members::Entity::find()
            .filter(clan_members::Column::UserId.eq(owner_id))
            .one(&txn)
            .await?
            .is_some();
        if already_member {
            return Ok(CreateClanOutcome::AlreadyInClan);
        }

        let clan = clans::ActiveModel {
            name: Set(new_clan.name),
            tag: Set(new_clan.tag),
            description: Set(new_clan.description),
            logo_url: Set(new_clan.logo_url),
            owner_id: Set(owner_id),
            points: Set(0),
            wins: Set(0),
            losses: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let clan = match clan {
            Ok(clan) => clan,
            Err(e) if is_unique_violation(&e) => return Ok(CreateClanOutcome::NameTaken),
            Err(e) => return Err(e).context("Failed to insert clan"),
        };

        let membership = clan_members::ActiveModel {
            clan_id: Set(clan.id),
            user_id: Set(owner_id),
            role: Set(ClanRole::Owner.as_str().to_string()),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        match membership {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(CreateClanOutcome::AlreadyInClan),
            Err(e) => return Err(e).context("Failed to insert clan owner membership"),
        }

        txn.commit().await?;
        Ok(CreateClanOutcome::Created(clan))
    }

    pub async fn update(
        &self,
        id: i32,
        update: ClanUpdate,
    ) -> Result<Option<WriteOutcome<clans::Model>>> {
        let Some(clan) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: clans::ActiveModel = clan.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(tag) = update.tag {
            active.tag = Set(tag);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(logo_url) = update.logo_url {
            active.logo_url = Set(Some(logo_url).filter(|l| !l.trim().is_empty()));
        }
        active.updated_at = Set(now_timestamp());

        match active.update(&self.conn).await {
            Ok(model) => Ok(Some(WriteOutcome::Written(model))),
            Err(e) if is_unique_violation(&e) => Ok(Some(WriteOutcome::Duplicate)),
            Err(e) => Err(e).context("Failed to update clan"),
        }
    }

    pub async fn update_stats(
        &self,
        id: i32,
        points: Option<i32>,
        wins: Option<i32>,
        losses: Option<i32>,
    ) -> Result<Option<clans::Model>> {
        let Some(clan) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: clans::ActiveModel = clan.into();
        if let Some(points) = points {
            active.points = Set(points);
        }
        if let Some(wins) = wins {
            active.wins = Set(wins);
        }
        if let Some(losses) = losses {
            active.losses = Set(losses);
        }
        active.updated_at = Set(now_timestamp());

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Removes the memberships first, then the clan.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        clan_members::Entity::delete_many()
            .filter(clan_members::Column::ClanId.eq(id))
            .exec(&txn)
            .await?;
        let result = clans::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Adds a regular member; `Duplicate` when the user already has a clan.
    pub async fn join(&self, clan_id: i32, user_id: i32) -> Result<WriteOutcome<()>> {
        let membership = clan_members::ActiveModel {
            clan_id: Set(clan_id),
            user_id: Set(user_id),
            role: Set(ClanRole::Member.as_str().to_string()),
            joined_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await;

        match membership {
            Ok(_) => Ok(WriteOutcome::Written(())),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert clan membership"),
        }
    }

    pub async fn remove_member(&self, clan_id: i32, user_id: i32) -> Result<bool> {
        let result = clan_members::Entity::delete_many()
            .filter(clan_members::Column::ClanId.eq(clan_id))
            .filter(clan_members::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove clan member")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn set_member_role(&self, clan_id: i32, user_id: i32, role: ClanRole) -> Result<bool> {
        let result = clan_members::Entity::update_many()
            .col_expr(clan_members::Column::Role, Expr::value(role.as_str()))
            .filter(clan_members::Column::ClanId.eq(clan_id))
            .filter(clan_members::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to update clan member role")?;
        Ok(result.rows_affected > 0)
    }
}
