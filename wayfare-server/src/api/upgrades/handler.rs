//! Certificate Upgrade Handlers
//!
//! 游客提交资质材料 → 缴升级费 → 管理员审核 → 通过则改角色。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{upgrade, user};
use crate::utils::validation::{self, MAX_NOTE_LEN, MAX_URL_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{
    NotificationKind, Role, UpgradeRequest, UpgradeReview, UpgradeStatus, UpgradeSubmit,
};

/// POST /api/upgrades - 提交升级申请
pub async fn submit(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<UpgradeSubmit>,
) -> AppResult<Json<UpgradeRequest>> {
    if !matches!(payload.target_role, Role::Host | Role::Agency) {
        return Err(AppError::validation("target_role must be HOST or AGENCY"));
    }
    if current_user.role != Role::Tourist {
        return Err(AppError::business("Only tourist accounts can request an upgrade"));
    }
    if payload.document_urls.is_empty() {
        return Err(AppError::validation("at least one certificate document is required"));
    }
    for url in &payload.document_urls {
        validation::validate_required_text(url, "document_url", MAX_URL_LEN)?;
    }
    validation::validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    // 同一用户同时只允许一个待审申请
    if upgrade::find_pending_by_user(&state.pool, current_user.id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("A pending upgrade request already exists"));
    }

    let created = upgrade::create(
        &state.pool,
        current_user.id,
        payload.target_role,
        &payload.document_urls,
        payload.note.as_deref(),
    )
    .await?;

    tracing::info!(
        request_id = created.id,
        user_id = current_user.id,
        target_role = created.target_role.as_str(),
        "Upgrade request submitted"
    );

    Ok(Json(created))
}

/// GET /api/upgrades/mine - 我的申请历史
pub async fn list_mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<UpgradeRequest>>> {
    let requests = upgrade::find_by_user(&state.pool, current_user.id).await?;
    Ok(Json(requests))
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<UpgradeStatus>,
}

/// GET /api/upgrades?status= - 申请列表 (admin，默认全量，待审在前)
pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UpgradeRequest>>> {
    let requests = upgrade::find_all(&state.pool, query.status).await?;
    Ok(Json(requests))
}

/// POST /api/upgrades/:id/review - 审批 (admin)
///
/// 通过要求升级费已缴；通过即改用户角色。驳回后用户可重新提交。
pub async fn review(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpgradeReview>,
) -> AppResult<Json<UpgradeRequest>> {
    validation::validate_optional_text(&payload.review_note, "review_note", MAX_NOTE_LEN)?;

    let target = upgrade::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Upgrade request {id}")))?;
    if target.status != UpgradeStatus::Pending {
        return Err(AppError::business("Request is already reviewed"));
    }

    if payload.approve {
        if !target.fee_paid {
            return Err(AppError::business("Upgrade fee has not been paid"));
        }
        let applicant = user::find_by_id(&state.pool, target.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::business("Applicant account is no longer active"))?;
        if applicant.role != Role::Tourist {
            return Err(AppError::business("Applicant already holds an elevated role"));
        }
    }

    let changed = upgrade::review(
        &state.pool,
        id,
        payload.approve,
        current_user.id,
        payload.review_note.as_deref(),
    )
    .await?;
    if !changed {
        // 并发审批：另一个管理员先落定了
        return Err(AppError::business("Request is already reviewed"));
    }

    if payload.approve {
        user::set_role(&state.pool, target.user_id, target.target_role).await?;
        tracing::info!(
            request_id = id,
            user_id = target.user_id,
            new_role = target.target_role.as_str(),
            "Upgrade approved"
        );
    } else {
        tracing::info!(request_id = id, user_id = target.user_id, "Upgrade rejected");
    }

    let outcome = if payload.approve { "approved" } else { "rejected" };
    state
        .notifier
        .notify(
            target.user_id,
            NotificationKind::UpgradeReviewed,
            "Upgrade reviewed",
            format!("Your upgrade request was {outcome}"),
            Some(id),
        )
        .await;

    let updated = upgrade::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Upgrade request {id}")))?;
    Ok(Json(updated))
}
