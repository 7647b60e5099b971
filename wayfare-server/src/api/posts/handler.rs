//! Post API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::post;
use crate::utils::validation::{self, MAX_CONTENT_LEN, MAX_URL_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{
    FeedQuery, NotificationKind, PostComment, PostCommentCreate, PostCommentDetail, PostCreate,
    PostDetail,
};

const DEFAULT_PAGE: i64 = 20;
const MAX_PAGE: i64 = 100;

fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
}

/// GET /api/posts/feed?before=&limit= - 动态流 (keyset 分页)
pub async fn feed(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<PostDetail>>> {
    let posts = post::feed(
        &state.pool,
        current_user.id,
        query.before,
        page_limit(query.limit),
    )
    .await?;
    Ok(Json(posts))
}

/// GET /api/posts/:id - 单条动态
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDetail>> {
    let found = post::find_by_id(&state.pool, current_user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post {id}")))?;
    Ok(Json(found))
}

/// POST /api/posts - 发布动态
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<PostCreate>,
) -> AppResult<Json<PostDetail>> {
    validation::validate_required_text(&payload.content, "content", MAX_CONTENT_LEN)?;
    if payload.image_urls.len() > 9 {
        return Err(AppError::validation("a post can carry at most 9 images"));
    }
    for url in &payload.image_urls {
        validation::validate_required_text(url, "image_url", MAX_URL_LEN)?;
    }

    let created = post::create(
        &state.pool,
        current_user.id,
        &payload.content,
        &payload.image_urls,
    )
    .await?;
    tracing::info!(post_id = created.post.id, author_id = current_user.id, "Post created");
    Ok(Json(created))
}

/// DELETE /api/posts/:id - 删除动态 (作者或 admin；评论点赞级联)
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let existing = post::find_by_id(&state.pool, current_user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post {id}")))?;
    if existing.post.author_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::forbidden("Not the author of this post"));
    }

    let result = post::delete(&state.pool, id).await?;
    Ok(Json(result))
}

/// GET /api/posts/:id/comments - 评论列表
pub async fn list_comments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PostCommentDetail>>> {
    let comments = post::comments(&state.pool, id).await?;
    Ok(Json(comments))
}

/// POST /api/posts/:id/comments - 发表评论
pub async fn add_comment(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PostCommentCreate>,
) -> AppResult<Json<PostComment>> {
    validation::validate_required_text(&payload.content, "content", MAX_CONTENT_LEN)?;

    let target = post::find_by_id(&state.pool, current_user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post {id}")))?;

    let created = post::add_comment(&state.pool, id, current_user.id, &payload.content).await?;

    if target.post.author_id != current_user.id {
        state
            .notifier
            .notify(
                target.post.author_id,
                NotificationKind::PostCommented,
                "New comment",
                format!("{} commented on your post", current_user.username),
                Some(id),
            )
            .await;
    }

    Ok(Json(created))
}

/// PUT /api/posts/:id/like - 点赞 (幂等)
pub async fn like(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let target = post::find_by_id(&state.pool, current_user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post {id}")))?;

    let newly_liked = post::like(&state.pool, id, current_user.id).await?;

    if newly_liked && target.post.author_id != current_user.id {
        state
            .notifier
            .notify(
                target.post.author_id,
                NotificationKind::PostLiked,
                "New like",
                format!("{} liked your post", current_user.username),
                Some(id),
            )
            .await;
    }

    Ok(Json(newly_liked))
}

/// DELETE /api/posts/:id/like - 取消点赞
pub async fn unlike(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = post::unlike(&state.pool, id, current_user.id).await?;
    Ok(Json(result))
}
