use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use super::notification::{NewNotification, insert_notification};
use crate::db::{WriteOutcome, is_unique_violation, now_timestamp};
use crate::domain::BadgeRarity;
use crate::entities::{badges, user_badges};

#[derive(Debug, Clone)]
pub struct BadgeInput {
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub rarity: BadgeRarity,
}

pub struct BadgeRepository {
    conn: DatabaseConnection,
}

impl BadgeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<badges::Model>> {
        badges::Entity::find()
            .order_by_asc(badges::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list badges")
    }

    /// Number of awards per badge id.
    pub async fn award_counts(&self) -> Result<HashMap<i32, i64>> {
        let rows: Vec<(i32, i64)> = user_badges::Entity::find()
            .select_only()
            .column(user_badges::Column::BadgeId)
            .column_as(user_badges::Column::Id.count(), "count")
            .group_by(user_badges::Column::BadgeId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count badge awards")?;

        Ok(rows.into_iter().collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<badges::Model>> {
        badges::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query badge")
    }

    pub async fn create(&self, input: BadgeInput) -> Result<WriteOutcome<badges::Model>> {
        let model = badges::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            icon_url: Set(input.icon_url),
            rarity: Set(input.rarity.as_str().to_string()),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        match model.insert(&self.conn).await {
            Ok(model) => Ok(WriteOutcome::Written(model)),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::Duplicate),
            Err(e) => Err(e).context("Failed to insert badge"),
        }
    }

    pub async fn update(
        &self,
        id: i32,
        input: BadgeInput,
    ) -> Result<Option<WriteOutcome<badges::Model>>> {
        let Some(badge) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: badges::ActiveModel = badge.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.icon_url = Set(input.icon_url);
        active.rarity = Set(input.rarity.as_str().to_string());

        match active.update(&self.conn).await {
            Ok(model) => Ok(Some(WriteOutcome::Written(model))),
            Err(e) if is_unique_violation(&e) => Ok(Some(WriteOutcome::Duplicate)),
            Err(e) => Err(e).context("Failed to update badge"),
        }
    }

    /// Removes the awards first, then the badge.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        user_badges::Entity::delete_many()
            .filter(user_badges::Column::BadgeId.eq(id))
            .exec(&txn)
            .await?;
        let result = badges::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Awards a badge and notifies the user in one transaction. The unique
    /// (user, badge) index decides concurrent awards.
    pub async fn award(
        &self,
        badge_id: i32,
        user_id: i32,
        awarded_by: i32,
        notification: NewNotification,
    ) -> Result<WriteOutcome<user_badges::Model>> {
        let txn = self.conn.begin().await?;

        let award = user_badges::ActiveModel {
            user_id: Set(user_id),
            badge_id: Set(badge_id),
            awarded_by: Set(Some(awarded_by)),
            awarded_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let award = match award {
            Ok(award) => award,
            Err(e) if is_unique_violation(&e) => return Ok(WriteOutcome::Duplicate),
            Err(e) => return Err(e).context("Failed to insert badge award"),
        };

        insert_notification(&txn, notification)
            .await
            .context("Failed to insert badge notification")?;

        txn.commit().await?;
        Ok(WriteOutcome::Written(award))
    }

    pub async fn revoke(&self, badge_id: i32, user_id: i32) -> Result<bool> {
        let result = user_badges::Entity::delete_many()
            .filter(user_badges::Column::BadgeId.eq(badge_id))
            .filter(user_badges::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to revoke badge")?;
        Ok(result.rows_affected > 0)
    }

    /// Badges held by a user, most recent award first.
    pub async fn for_user(&self, user_id: i32) -> Result<Vec<(user_badges::Model, badges::Model)>> {
        let rows = user_badges::Entity::find()
            .filter(user_badges::Column::UserId.eq(user_id))
            .find_also_related(badges::Entity)
            .order_by_desc(user_badges::Column::AwardedAt)
            .all(&self.conn)
            .await
            .context("Failed to query user badges")?;

        Ok(rows
            .into_iter()
            .filter_map(|(award, badge)| badge.map(|b| (award, b)))
            .collect())
    }
}
