//! User Admin Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::{AppError, AppResult};
use shared::models::{User, UserPublic};

/// GET /api/users - 全部用户 (admin)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users))
}

/// GET /api/users/:id - 公开资料
pub async fn get_public(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserPublic>> {
    let profile = user::find_public(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", id)))?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// PUT /api/users/:id/active - 启用/停用账号 (admin)
pub async fn set_active(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> AppResult<Json<bool>> {
    let changed = user::set_active(&state.pool, id, req.is_active).await?;
    if !changed {
        return Err(AppError::not_found(format!("User {}", id)));
    }
    tracing::info!(user_id = id, is_active = req.is_active, "User active flag changed");
    Ok(Json(true))
}
