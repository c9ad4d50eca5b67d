use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};

use crate::db::{is_unique_violation, now_timestamp};
use crate::domain::CmsContentType;
use crate::entities::cms_content;

pub struct CmsRepository {
    conn: DatabaseConnection,
}

impl CmsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The active row for a page, regardless of its publish flag.
    pub async fn active(&self, content_type: CmsContentType) -> Result<Option<cms_content::Model>> {
        Self::find_active(&self.conn, content_type)
            .await
            .context("Failed to query active CMS content")
    }

    async fn find_active<C: ConnectionTrait>(
        conn: &C,
        content_type: CmsContentType,
    ) -> Result<Option<cms_content::Model>, DbErr> {
        cms_content::Entity::find()
            .filter(cms_content::Column::ContentType.eq(content_type.as_str()))
            .filter(cms_content::Column::IsActive.eq(true))
            .one(conn)
            .await
    }

    /// Writes `content` as the single active, published row of the page.
    ///
    /// A partial unique index allows one active row per page. A save that
    /// loses the race to create it retries as an update of the winner's row.
    pub async fn save(
        &self,
        content_type: CmsContentType,
        content: String,
        updated_by: i32,
    ) -> Result<cms_content::Model> {
        for _ in 0..2 {
            match self.try_save(content_type, &content, updated_by).await {
                Ok(saved) => return Ok(saved),
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e).context("Failed to save CMS content"),
            }
        }
        anyhow::bail!("CMS content kept changing while saving")
    }

    async fn try_save(
        &self,
        content_type: CmsContentType,
        content: &str,
        updated_by: i32,
    ) -> Result<cms_content::Model, DbErr> {
        let txn = self.conn.begin().await?;
        let now = now_timestamp();

        // Writing first takes the database write lock for the whole transaction.
        let updated = cms_content::Entity::update_many()
            .col_expr(cms_content::Column::Content, Expr::value(content))
            .col_expr(cms_content::Column::IsPublished, Expr::value(true))
            .col_expr(cms_content::Column::PublishedAt, Expr::value(Some(now.clone())))
            .col_expr(cms_content::Column::UpdatedBy, Expr::value(Some(updated_by)))
            .col_expr(cms_content::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(cms_content::Column::ContentType.eq(content_type.as_str()))
            .filter(cms_content::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let saved = if updated.rows_affected == 0 {
            cms_content::ActiveModel {
                content_type: Set(content_type.as_str().to_string()),
                content: Set(content.to_string()),
                is_active: Set(true),
                is_published: Set(true),
                published_at: Set(Some(now.clone())),
                updated_by: Set(Some(updated_by)),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        } else {
            Self::find_active(&txn, content_type)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound("active CMS content".to_string()))?
        };

        txn.commit().await?;
        Ok(saved)
    }

    /// Marks the active row published now. `None` when the page has no content.
    pub async fn publish(
        &self,
        content_type: CmsContentType,
        updated_by: i32,
    ) -> Result<Option<cms_content::Model>> {
        let Some(current) = self.active(content_type).await? else {
            return Ok(None);
        };

        let now = now_timestamp();
        let mut active: cms_content::ActiveModel = current.into();
        active.is_published = Set(true);
        active.published_at = Set(Some(now.clone()));
        active.updated_by = Set(Some(updated_by));
        active.updated_at = Set(now);

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Deactivates every row of the page so readers fall back to the defaults.
    pub async fn reset(&self, content_type: CmsContentType) -> Result<u64> {
        let result = cms_content::Entity::update_many()
            .col_expr(cms_content::Column::IsActive, Expr::value(false))
            .col_expr(cms_content::Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(cms_content::Column::ContentType.eq(content_type.as_str()))
            .filter(cms_content::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to reset CMS content")?;
        Ok(result.rows_affected)
    }
}
