//! Coupon API Handlers
//!
//! 发行与管理是 host 侧功能；`check` 给下单前的前端预检用。
//! 真正的应用/移除在预订路由 (事务内领取名额)。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{combo, coupon};
use crate::pricing;
use crate::utils::validation;
use crate::utils::{AppError, AppResult};
use shared::models::{BookingItem, Coupon, CouponCheck, CouponCreate, CouponUpdate, Discount};

fn validate_discount(discount: &Discount) -> AppResult<()> {
    match discount {
        Discount::Percent(p) => {
            if !p.is_finite() || *p <= 0.0 || *p > 100.0 {
                return Err(AppError::validation(format!(
                    "percent discount must be in (0, 100], got {p}"
                )));
            }
        }
        Discount::Fixed(f) => {
            validation::validate_price(*f, "fixed discount")?;
            if *f <= 0.0 {
                return Err(AppError::validation("fixed discount must be positive"));
            }
        }
    }
    Ok(())
}

/// GET /api/coupons - 自己发行的优惠券
pub async fn list_mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Coupon>>> {
    let coupons = coupon::find_by_host(&state.pool, current_user.id).await?;
    Ok(Json(coupons))
}

/// POST /api/coupons - 发行优惠券
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    validation::validate_coupon_code(&payload.code)?;
    validate_discount(&payload.discount)?;
    if let Some(limit) = payload.usage_limit
        && limit <= 0
    {
        return Err(AppError::validation("usage_limit must be positive"));
    }
    if let Some(level) = payload.min_user_level
        && level < 1
    {
        return Err(AppError::validation("min_user_level must be >= 1"));
    }

    // 套餐限定券只能指向自己的套餐
    if let Some(scope) = payload.combo_scope {
        let scoped = combo::find_by_id(&state.pool, scope)
            .await?
            .ok_or_else(|| AppError::validation(format!("Combo {scope} not found")))?;
        if scoped.host_id != current_user.id && !current_user.is_admin() {
            return Err(AppError::forbidden("Combo belongs to another host"));
        }
    }

    let created = coupon::create(&state.pool, current_user.id, payload).await?;
    tracing::info!(coupon_id = created.id, code = %created.code, "Coupon issued");
    Ok(Json(created))
}

/// PUT /api/coupons/:id - 更新标志/限额/过期 (折扣与码不可变)
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CouponUpdate>,
) -> AppResult<Json<Coupon>> {
    let existing = coupon::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Coupon {}", id)))?;
    if existing.host_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::forbidden("Not the issuer of this coupon"));
    }

    if let Some(limit) = payload.usage_limit {
        if limit <= 0 {
            return Err(AppError::validation("usage_limit must be positive"));
        }
        // 不允许把限额压到已用量之下
        if limit < existing.usage_count {
            return Err(AppError::validation(format!(
                "usage_limit {} is below current usage count {}",
                limit, existing.usage_count
            )));
        }
    }

    let updated = coupon::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct CheckRequest {
    pub code: String,
    pub item: BookingItem,
    pub quantity: i64,
}

/// POST /api/coupons/check - 下单前预检：能否用 + 折扣额
pub async fn check(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<CheckRequest>,
) -> AppResult<Json<CouponCheck>> {
    let result = pricing::check_coupon(
        &state.pool,
        current_user.level,
        &req.code,
        &req.item,
        req.quantity,
    )
    .await?;
    Ok(Json(result))
}
