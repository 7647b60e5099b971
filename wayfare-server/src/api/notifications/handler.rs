//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::{AppError, AppResult};
use shared::models::{Notification, UnreadCount};

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub before: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/notifications?before=&limit= - 我的通知
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let notifications =
        notification::list_for_user(&state.pool, current_user.id, query.before, limit).await?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count - 未读计数
pub async fn unread_count(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    let unread = notification::unread_count(&state.pool, current_user.id).await?;
    Ok(Json(UnreadCount { unread }))
}

/// POST /api/notifications/:id/read - 标记单条已读
pub async fn mark_read(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let changed = notification::mark_read(&state.pool, id, current_user.id).await?;
    if !changed {
        return Err(AppError::not_found(format!("Notification {id}")));
    }
    Ok(Json(true))
}

/// POST /api/notifications/read-all - 全部标记已读
pub async fn mark_all_read(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<i64>> {
    let marked = notification::mark_all_read(&state.pool, current_user.id).await?;
    Ok(Json(marked))
}
