//! Service Combo API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{combo, service};
use crate::utils::validation::{self, MAX_NOTE_LEN, MAX_TITLE_LEN, MAX_URL_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{ComboCreate, ComboDetail, ComboItemInput, ComboUpdate, ServiceCombo};

fn ensure_owner(combo: &ServiceCombo, user: &CurrentUser) -> AppResult<()> {
    if combo.host_id != user.id && !user.is_admin() {
        return Err(AppError::forbidden("Not the owner of this combo"));
    }
    Ok(())
}

/// 子项必须存在、在架、且归同一 host
async fn validate_items(
    state: &ServerState,
    host_id: i64,
    items: &[ComboItemInput],
) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::validation("combo must contain at least one service"));
    }
    for item in items {
        let svc = service::find_by_id(&state.pool, item.service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                AppError::validation(format!("Service {} not found or inactive", item.service_id))
            })?;
        if svc.host_id != host_id {
            return Err(AppError::validation(format!(
                "Service {} belongs to another host",
                item.service_id
            )));
        }
    }
    Ok(())
}

/// GET /api/combos - 公开目录 (仅活跃)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ServiceCombo>>> {
    let combos = combo::find_active(&state.pool).await?;
    Ok(Json(combos))
}

/// GET /api/combos/mine - 自己发布的套餐 (含下架)
pub async fn list_mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ServiceCombo>>> {
    let combos = combo::find_by_host(&state.pool, current_user.id).await?;
    Ok(Json(combos))
}

/// GET /api/combos/:id - 套餐详情 (含子项)
pub async fn get_detail(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ComboDetail>> {
    let detail = combo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Combo {}", id)))?;
    Ok(Json(detail))
}

/// POST /api/combos - 发布套餐
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ComboCreate>,
) -> AppResult<Json<ComboDetail>> {
    validation::validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
    validation::validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validation::validate_price(payload.price, "price")?;
    validation::validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_items(&state, current_user.id, &payload.items).await?;

    let created = combo::create(&state.pool, current_user.id, payload).await?;
    tracing::info!(combo_id = created.combo.id, host_id = current_user.id, "Combo created");
    Ok(Json(created))
}

/// PUT /api/combos/:id - 更新套餐 (items 整组替换)
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ComboUpdate>,
) -> AppResult<Json<ComboDetail>> {
    let existing = combo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Combo {}", id)))?;
    ensure_owner(&existing, &current_user)?;

    if let Some(title) = &payload.title {
        validation::validate_required_text(title, "title", MAX_TITLE_LEN)?;
    }
    validation::validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(price) = payload.price {
        validation::validate_price(price, "price")?;
    }
    if let Some(items) = &payload.items {
        validate_items(&state, existing.host_id, items).await?;
    }

    let updated = combo::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/combos/:id - 下架 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let existing = combo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Combo {}", id)))?;
    ensure_owner(&existing, &current_user)?;

    let result = combo::delete(&state.pool, id).await?;
    if result {
        tracing::info!(combo_id = id, "Combo deactivated");
    }
    Ok(Json(result))
}
