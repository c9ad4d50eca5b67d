use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};

use super::fetch_page;
use crate::db::now_timestamp;
use crate::domain::{NotificationType, PageParams, Paginated};
use crate::entities::notifications;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i32,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Inserts on any connection so callers can enlist it in their transaction.
pub(crate) async fn insert_notification<C: ConnectionTrait>(
    conn: &C,
    notification: NewNotification,
) -> Result<notifications::Model, DbErr> {
    notifications::ActiveModel {
        user_id: Set(notification.user_id),
        notification_type: Set(notification.kind.as_str().to_string()),
        title: Set(notification.title),
        message: Set(notification.message),
        link: Set(notification.link),
        is_read: Set(false),
        created_at: Set(now_timestamp()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub struct NotificationRepository {
    conn: DatabaseConnection,
}

impl NotificationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        user_id: i32,
        unread_only: bool,
        params: PageParams,
    ) -> Result<Paginated<notifications::Model>> {
        let mut query =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notifications::Column::IsRead.eq(false));
        }

        fetch_page(
            &self.conn,
            query
                .order_by_desc(notifications::Column::CreatedAt)
                .order_by_desc(notifications::Column::Id),
            params,
        )
        .await
    }

    pub async fn unread_count(&self, user_id: i32) -> Result<u64> {
        notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.conn)
            .await
            .context("Failed to count unread notifications")
    }

    pub async fn get(&self, id: i32) -> Result<Option<notifications::Model>> {
        notifications::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query notification")
    }

    pub async fn create(&self, notification: NewNotification) -> Result<notifications::Model> {
        insert_notification(&self.conn, notification)
            .await
            .context("Failed to insert notification")
    }

    pub async fn mark_read(&self, id: i32) -> Result<()> {
        notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to mark notification read")?;
        Ok(())
    }

    /// Returns the number of notifications that changed state.
    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to mark notifications read")?;
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = notifications::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete notification")?;
        Ok(result.rows_affected > 0)
    }
}
