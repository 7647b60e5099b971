//! Service API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::service;
use crate::utils::validation::{self, MAX_NOTE_LEN, MAX_TITLE_LEN, MAX_URL_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{Service, ServiceCreate, ServiceFilter, ServiceUpdate};

/// 属主或管理员才能改动
fn ensure_owner(service: &Service, user: &CurrentUser) -> AppResult<()> {
    if service.host_id != user.id && !user.is_admin() {
        return Err(AppError::forbidden("Not the owner of this service"));
    }
    Ok(())
}

fn validate_payload(
    title: Option<&String>,
    description: &Option<String>,
    price: Option<f64>,
    image_url: &Option<String>,
) -> AppResult<()> {
    if let Some(title) = title {
        validation::validate_required_text(title, "title", MAX_TITLE_LEN)?;
    }
    validation::validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    if let Some(price) = price {
        validation::validate_price(price, "price")?;
    }
    validation::validate_optional_text(image_url, "image_url", MAX_URL_LEN)?;
    Ok(())
}

/// GET /api/services - 公开目录 (仅活跃)
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ServiceFilter>,
) -> AppResult<Json<Vec<Service>>> {
    let services = service::find_active(&state.pool, &filter).await?;
    Ok(Json(services))
}

/// GET /api/services/mine - 自己发布的服务 (含下架)
pub async fn list_mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Service>>> {
    let services = service::find_by_host(&state.pool, current_user.id).await?;
    Ok(Json(services))
}

/// GET /api/services/:id - 单个服务
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Service>> {
    let found = service::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service {}", id)))?;
    Ok(Json(found))
}

/// POST /api/services - 发布服务
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ServiceCreate>,
) -> AppResult<Json<Service>> {
    validate_payload(
        Some(&payload.title),
        &payload.description,
        Some(payload.price),
        &payload.image_url,
    )?;

    let created = service::create(&state.pool, current_user.id, payload).await?;
    tracing::info!(service_id = created.id, host_id = current_user.id, "Service created");
    Ok(Json(created))
}

/// PUT /api/services/:id - 更新服务
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ServiceUpdate>,
) -> AppResult<Json<Service>> {
    let existing = service::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service {}", id)))?;
    ensure_owner(&existing, &current_user)?;

    validate_payload(
        payload.title.as_ref(),
        &payload.description,
        payload.price,
        &payload.image_url,
    )?;

    let updated = service::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/services/:id - 下架 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let existing = service::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service {}", id)))?;
    ensure_owner(&existing, &current_user)?;

    let result = service::delete(&state.pool, id).await?;
    if result {
        tracing::info!(service_id = id, "Service deactivated");
    }
    Ok(Json(result))
}
