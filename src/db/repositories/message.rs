use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};

use super::fetch_page;
use super::notification::{NewNotification, insert_notification};
use crate::db::now_timestamp;
use crate::domain::{PageParams, Paginated};
use crate::entities::messages;

pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn inbox(
        &self,
        user_id: i32,
        unread_only: bool,
        params: PageParams,
    ) -> Result<Paginated<messages::Model>> {
        let mut query = messages::Entity::find().filter(messages::Column::RecipientId.eq(user_id));
        if unread_only {
            query = query.filter(messages::Column::IsRead.eq(false));
        }

        fetch_page(
            &self.conn,
            query
                .order_by_desc(messages::Column::CreatedAt)
                .order_by_desc(messages::Column::Id),
            params,
        )
        .await
    }

    pub async fn sent(&self, user_id: i32, params: PageParams) -> Result<Paginated<messages::Model>> {
        fetch_page(
            &self.conn,
            messages::Entity::find()
                .filter(messages::Column::SenderId.eq(user_id))
                .order_by_desc(messages::Column::CreatedAt)
                .order_by_desc(messages::Column::Id),
            params,
        )
        .await
    }

    /// Messages exchanged between two users in either direction, oldest first.
    pub async fn conversation(
        &self,
        user_id: i32,
        other_id: i32,
        params: PageParams,
    ) -> Result<Paginated<messages::Model>> {
        let between = Condition::any()
            .add(
                Condition::all()
                    .add(messages::Column::SenderId.eq(user_id))
                    .add(messages::Column::RecipientId.eq(other_id)),
            )
            .add(
                Condition::all()
                    .add(messages::Column::SenderId.eq(other_id))
                    .add(messages::Column::RecipientId.eq(user_id)),
            );

        fetch_page(
            &self.conn,
            messages::Entity::find()
                .filter(between)
                .order_by_asc(messages::Column::CreatedAt)
                .order_by_asc(messages::Column::Id),
            params,
        )
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<messages::Model>> {
        messages::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query message")
    }

    /// Stores the message and the recipient's notification together.
    pub async fn send(
        &self,
        sender_id: i32,
        recipient_id: i32,
        content: String,
        notification: NewNotification,
    ) -> Result<messages::Model> {
        let txn = self.conn.begin().await?;

        let message = messages::ActiveModel {
            sender_id: Set(sender_id),
            recipient_id: Set(recipient_id),
            content: Set(content),
            is_read: Set(false),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert message")?;

        insert_notification(&txn, notification)
            .await
            .context("Failed to insert message notification")?;

        txn.commit().await?;
        Ok(message)
    }

    pub async fn mark_read(&self, id: i32) -> Result<()> {
        messages::Entity::update_many()
            .col_expr(messages::Column::IsRead, Expr::value(true))
            .filter(messages::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to mark message read")?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = messages::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete message")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn unread_count(&self, user_id: i32) -> Result<u64> {
        messages::Entity::find()
            .filter(messages::Column::RecipientId.eq(user_id))
            .filter(messages::Column::IsRead.eq(false))
            .count(&self.conn)
            .await
            .context("Failed to count unread messages")
    }
}
