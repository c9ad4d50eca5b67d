use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::validation::{
    MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH, page_params, parse_enum, validate_id,
    validate_search_query, validate_text,
};
use super::{
    ApiError, ApiResponse, AppState, CommentDto, CurrentUser, LikeResponse, MaybeUser,
    MessageResponse, PinResponse, PostDetailDto, PostDto,
};
use crate::db::NewNotification;
use crate::db::repositories::forum::{NewPost, PostFilter, PostUpdate};
use crate::domain::forum::normalize_tags;
use crate::domain::pagination::PageQuery;
use crate::domain::{ForumCategory, NotificationType, Paginated};
use crate::entities::forum_posts;
use crate::services::{Requirement, authorize};

const POST_REQUIRED: &str = "Title and content are required";

#[derive(Deserialize, Default)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub author_id: Option<i32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CommentRequest {
    pub content: String,
}

async fn load_post(state: &AppState, id: i32) -> Result<forum_posts::Model, ApiError> {
    state
        .store()
        .forum()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))
}

fn tags(state: &AppState, raw: &[String]) -> Result<Vec<String>, ApiError> {
    normalize_tags(raw, state.config().community.max_forum_tags)
        .map_err(|e| ApiError::validation(e.to_string()))
}

/// GET /forum/posts
///
/// Pinned posts first, then newest first.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ApiResponse<Paginated<PostDto>>>, ApiError> {
    let filter = PostFilter {
        category: parse_enum::<ForumCategory>(query.category.as_deref())?,
        search: validate_search_query(query.search.as_deref())?,
        tag: query
            .tag
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty()),
        author_id: query.author_id,
    };
    let params = page_params(page, &state.config().community);

    let store = state.store();
    let posts = store.forum().list(&filter, params).await?;

    let ids: Vec<i32> = posts.items.iter().map(|p| p.id).collect();
    let author_ids: Vec<i32> = posts.items.iter().map(|p| p.author_id).collect();
    let likes = store.forum().like_counts(&ids).await?;
    let comments = store.forum().comment_counts(&ids).await?;
    let authors = store.users().usernames_by_ids(&author_ids).await?;

    Ok(Json(ApiResponse::success(posts.map(|post| {
        let like_count = likes.get(&post.id).copied().unwrap_or(0);
        let comment_count = comments.get(&post.id).copied().unwrap_or(0);
        let author = authors.get(&post.author_id).cloned();
        PostDto::new(post, author, like_count, comment_count)
    }))))
}

/// POST /forum/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostDto>>), ApiError> {
    let title = validate_text(&payload.title, MAX_TITLE_LENGTH, POST_REQUIRED)?;
    let content = validate_text(&payload.content, MAX_CONTENT_LENGTH, POST_REQUIRED)?;
    let category = parse_enum::<ForumCategory>(payload.category.as_deref())?
        .unwrap_or(ForumCategory::General);
    let tags = tags(&state, &payload.tags)?;

    let post = state
        .store()
        .forum()
        .create(NewPost {
            title,
            content,
            category,
            tags,
            author_id: caller.id,
        })
        .await?;

    tracing::info!(post_id = post.id, author_id = caller.id, "Forum post created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PostDto::new(
            post,
            Some(caller.username),
            0,
            0,
        ))),
    ))
}

/// GET /forum/posts/{id}
///
/// Counts as a view.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PostDetailDto>>, ApiError> {
    let id = validate_id(id, "post")?;
    let forum = state.store().forum();

    let mut post = load_post(&state, id).await?;
    forum.increment_views(id).await?;
    post.views += 1;

    let comments = forum.comments(id).await?;
    let mut author_ids: Vec<i32> = comments.iter().map(|c| c.author_id).collect();
    author_ids.push(post.author_id);
    let authors: HashMap<i32, String> = state.store().users().usernames_by_ids(&author_ids).await?;

    let like_count = forum.like_count(id).await?;
    let liked = match &viewer {
        Some(viewer) => forum.has_liked(id, viewer.id).await?,
        None => false,
    };

    let comments: Vec<CommentDto> = comments
        .into_iter()
        .map(|c| {
            let author = authors.get(&c.author_id).cloned();
            CommentDto::new(c, author)
        })
        .collect();
    let comment_count = i64::try_from(comments.len()).unwrap_or(i64::MAX);
    let author = authors.get(&post.author_id).cloned();

    Ok(Json(ApiResponse::success(PostDetailDto {
        post: PostDto::new(
            post,
            author,
            i64::try_from(like_count).unwrap_or(i64::MAX),
            comment_count,
        ),
        comments,
        liked,
    })))
}

/// PUT /forum/posts/{id}
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let id = validate_id(id, "post")?;
    let existing = load_post(&state, id).await?;
    authorize(&caller, Requirement::OwnerOrModerator(existing.author_id))?;

    let update = PostUpdate {
        title: payload
            .title
            .map(|t| validate_text(&t, MAX_TITLE_LENGTH, POST_REQUIRED))
            .transpose()?,
        content: payload
            .content
            .map(|c| validate_text(&c, MAX_CONTENT_LENGTH, POST_REQUIRED))
            .transpose()?,
        category: parse_enum::<ForumCategory>(payload.category.as_deref())?,
        tags: payload.tags.map(|t| tags(&state, &t)).transpose()?,
    };

    let forum = state.store().forum();
    let post = forum
        .update(id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    let like_count = forum.like_counts(&[id]).await?.get(&id).copied().unwrap_or(0);
    let comment_count = forum
        .comment_counts(&[id])
        .await?
        .get(&id)
        .copied()
        .unwrap_or(0);
    let author = state
        .store()
        .users()
        .usernames_by_ids(&[post.author_id])
        .await?
        .remove(&post.author_id);

    Ok(Json(ApiResponse::success(PostDto::new(
        post,
        author,
        like_count,
        comment_count,
    ))))
}

/// DELETE /forum/posts/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "post")?;
    let existing = load_post(&state, id).await?;
    authorize(&caller, Requirement::OwnerOrModerator(existing.author_id))?;

    if !state.store().forum().delete(id).await? {
        return Err(ApiError::not_found("Post", id));
    }

    tracing::info!(post_id = id, deleted_by = caller.id, "Forum post deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new("Post deleted"))))
}

/// POST /forum/posts/{id}/pin
pub async fn toggle_pin(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PinResponse>>, ApiError> {
    authorize(&caller, Requirement::Moderator)?;
    let id = validate_id(id, "post")?;

    let is_pinned = state
        .store()
        .forum()
        .toggle_pin(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", id))?;

    Ok(Json(ApiResponse::success(PinResponse { is_pinned })))
}

/// POST /forum/posts/{id}/like
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<LikeResponse>>, ApiError> {
    let id = validate_id(id, "post")?;
    load_post(&state, id).await?;

    let forum = state.store().forum();
    let liked = forum.toggle_like(id, caller.id).await?;
    let like_count = forum.like_count(id).await?;

    Ok(Json(ApiResponse::success(LikeResponse { liked, like_count })))
}

/// POST /forum/posts/{id}/comments
///
/// The post's author is notified unless they wrote the comment.
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentDto>>), ApiError> {
    let id = validate_id(id, "post")?;
    let post = load_post(&state, id).await?;
    let content = validate_text(
        &payload.content,
        MAX_CONTENT_LENGTH,
        "Comment content is required",
    )?;

    let comment = state
        .store()
        .forum()
        .add_comment(id, caller.id, content)
        .await?;

    if post.author_id != caller.id {
        state
            .store()
            .notifications()
            .create(NewNotification {
                user_id: post.author_id,
                kind: NotificationType::Forum,
                title: "New comment".to_string(),
                message: format!("{} commented on \"{}\"", caller.username, post.title),
                link: Some(format!("/forum/{id}")),
            })
            .await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CommentDto::new(
            comment,
            Some(caller.username),
        ))),
    ))
}

/// DELETE /forum/comments/{id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id, "comment")?;
    let comment = state
        .store()
        .forum()
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment", id))?;
    authorize(&caller, Requirement::OwnerOrModerator(comment.author_id))?;

    state.store().forum().delete_comment(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Comment deleted",
    ))))
}
