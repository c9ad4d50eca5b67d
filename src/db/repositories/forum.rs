use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;

use super::{contains_pattern, fetch_page};
use crate::db::{is_unique_violation, now_timestamp};
use crate::domain::forum::encode_tags;
use crate::domain::{ForumCategory, PageParams, Paginated};
use crate::entities::{forum_comments, forum_likes, forum_posts};

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<ForumCategory>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub author_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
    pub tags: Vec<String>,
    pub author_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<ForumCategory>,
    pub tags: Option<Vec<String>>,
}

pub struct ForumRepository {
    conn: DatabaseConnection,
}

impl ForumRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Pinned posts first, then newest first.
    pub async fn list(
        &self,
        filter: &PostFilter,
        params: PageParams,
    ) -> Result<Paginated<forum_posts::Model>> {
        let mut query = forum_posts::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(forum_posts::Column::Category.eq(category.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(forum_posts::Column::Title.like(contains_pattern(search)))
                    .add(forum_posts::Column::Content.like(contains_pattern(search))),
            );
        }
        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            // Tags are stored as a JSON array of strings, so the quoted form
            // matches whole tags only.
            let quoted = serde_json::to_string(&tag.trim().to_lowercase())
                .context("Failed to encode tag filter")?;
            query = query.filter(forum_posts::Column::Tags.like(contains_pattern(&quoted)));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(forum_posts::Column::AuthorId.eq(author_id));
        }

        fetch_page(
            &self.conn,
            query
                .order_by_desc(forum_posts::Column::IsPinned)
                .order_by_desc(forum_posts::Column::CreatedAt)
                .order_by_desc(forum_posts::Column::Id),
            params,
        )
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<forum_posts::Model>> {
        forum_posts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query forum post")
    }

    pub async fn increment_views(&self, id: i32) -> Result<()> {
        forum_posts::Entity::update_many()
            .col_expr(
                forum_posts::Column::Views,
                Expr::col(forum_posts::Column::Views).add(1),
            )
            .filter(forum_posts::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to increment post views")?;
        Ok(())
    }

    pub async fn create(&self, new: NewPost) -> Result<forum_posts::Model> {
        let now = now_timestamp();
        forum_posts::ActiveModel {
            title: Set(new.title),
            content: Set(new.content),
            category: Set(new.category.as_str().to_string()),
            tags: Set(encode_tags(&new.tags)),
            author_id: Set(new.author_id),
            views: Set(0),
            is_pinned: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert forum post")
    }

    pub async fn update(&self, id: i32, update: PostUpdate) -> Result<Option<forum_posts::Model>> {
        let Some(post) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: forum_posts::ActiveModel = post.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(content) = update.content {
            active.content = Set(content);
        }
        if let Some(category) = update.category {
            active.category = Set(category.as_str().to_string());
        }
        if let Some(tags) = update.tags {
            active.tags = Set(encode_tags(&tags));
        }
        active.updated_at = Set(now_timestamp());

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Removes likes and comments first, then the post.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        forum_likes::Entity::delete_many()
            .filter(forum_likes::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        forum_comments::Entity::delete_many()
            .filter(forum_comments::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        let result = forum_posts::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Flips the pinned flag, returning the new value.
    pub async fn toggle_pin(&self, id: i32) -> Result<Option<bool>> {
        let Some(post) = self.get(id).await? else {
            return Ok(None);
        };

        let pinned = !post.is_pinned;
        let mut active: forum_posts::ActiveModel = post.into();
        active.is_pinned = Set(pinned);
        active.update(&self.conn).await?;

        Ok(Some(pinned))
    }

    /// Likes the post, or removes an existing like. Returns whether the caller
    /// now likes the post.
    pub async fn toggle_like(&self, post_id: i32, user_id: i32) -> Result<bool> {
        let removed = forum_likes::Entity::delete_many()
            .filter(forum_likes::Column::PostId.eq(post_id))
            .filter(forum_likes::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove like")?;

        if removed.rows_affected > 0 {
            return Ok(false);
        }

        let inserted = forum_likes::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await;

        match inserted {
            Ok(_) => Ok(true),
            // A concurrent toggle already inserted the like.
            Err(e) if is_unique_violation(&e) => Ok(true),
            Err(e) => Err(e).context("Failed to insert like"),
        }
    }

    pub async fn like_count(&self, post_id: i32) -> Result<u64> {
        forum_likes::Entity::find()
            .filter(forum_likes::Column::PostId.eq(post_id))
            .count(&self.conn)
            .await
            .context("Failed to count likes")
    }

    pub async fn has_liked(&self, post_id: i32, user_id: i32) -> Result<bool> {
        let count = forum_likes::Entity::find()
            .filter(forum_likes::Column::PostId.eq(post_id))
            .filter(forum_likes::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to query like")?;
        Ok(count > 0)
    }

    pub async fn like_counts(&self, post_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = forum_likes::Entity::find()
            .select_only()
            .column(forum_likes::Column::PostId)
            .column_as(forum_likes::Column::Id.count(), "count")
            .filter(forum_likes::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(forum_likes::Column::PostId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count likes")?;

        Ok(rows.into_iter().collect())
    }

    pub async fn comment_counts(&self, post_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = forum_comments::Entity::find()
            .select_only()
            .column(forum_comments::Column::PostId)
            .column_as(forum_comments::Column::Id.count(), "count")
            .filter(forum_comments::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(forum_comments::Column::PostId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count comments")?;

        Ok(rows.into_iter().collect())
    }

    pub async fn comments(&self, post_id: i32) -> Result<Vec<forum_comments::Model>> {
        forum_comments::Entity::find()
            .filter(forum_comments::Column::PostId.eq(post_id))
            .order_by_asc(forum_comments::Column::CreatedAt)
            .order_by_asc(forum_comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query comments")
    }

    pub async fn get_comment(&self, id: i32) -> Result<Option<forum_comments::Model>> {
        forum_comments::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment")
    }

    pub async fn add_comment(
        &self,
        post_id: i32,
        author_id: i32,
        content: String,
    ) -> Result<forum_comments::Model> {
        let now = now_timestamp();
        forum_comments::ActiveModel {
            post_id: Set(post_id),
            author_id: Set(author_id),
            content: Set(content),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert comment")
    }

    pub async fn delete_comment(&self, id: i32) -> Result<bool> {
        let result = forum_comments::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete comment")?;
        Ok(result.rows_affected > 0)
    }
}
