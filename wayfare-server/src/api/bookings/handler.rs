//! Booking API Handlers
//!
//! 创建时即完成报价与优惠券领取 (单事务)；状态迁移是原子条件更新。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{booking, combo, coupon, service};
use crate::pricing;
use crate::utils::validation::{self, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{
    ApplyCouponRequest, Booking, BookingCreate, BookingFilter, BookingItem, BookingQuote,
    BookingStatus, NotificationKind,
};

/// 条目属主 (host) 的用户 ID
async fn item_host_id(state: &ServerState, item: &BookingItem) -> AppResult<i64> {
    match item {
        BookingItem::Service(id) => Ok(service::find_by_id(&state.pool, *id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {id}")))?
            .host_id),
        BookingItem::Combo(id) => Ok(combo::find_by_id(&state.pool, *id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Combo {id}")))?
            .host_id),
    }
}

async fn find_booking(state: &ServerState, id: i64) -> AppResult<Booking> {
    booking::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {id}")))
}

/// POST /api/bookings/quote - 只读报价
pub async fn quote(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<BookingQuote>> {
    let quote = pricing::build_quote(&state.pool, current_user.level, &payload).await?;
    Ok(Json(BookingQuote::from(&quote)))
}

/// POST /api/bookings - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<Booking>> {
    validation::validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let quote = pricing::build_quote(&state.pool, current_user.level, &payload).await?;

    let created = booking::create(
        &state.pool,
        booking::NewBooking {
            user_id: current_user.id,
            item: payload.item,
            quantity: payload.quantity,
            unit_price: quote.unit_price,
            bonus_service_id: payload.bonus_service_id,
            bonus_price: quote.bonus_price,
            discount_amount: quote.discount_amount,
            total_amount: quote.total_amount,
            note: payload.note.clone(),
            coupon_id: quote.coupon.as_ref().map(|c| c.id),
        },
    )
    .await
    .map_err(|e| match e {
        // 并发把最后一个名额抢走：报价通过但领取失败
        crate::db::repository::RepoError::Validation(msg) => AppError::business(msg),
        other => other.into(),
    })?;

    tracing::info!(
        booking_id = created.id,
        user_id = current_user.id,
        total = created.total_amount,
        "Booking created"
    );

    // 通知条目属主；失败只记日志
    if let Ok(host_id) = item_host_id(&state, &created.item).await {
        state
            .notifier
            .notify(
                host_id,
                NotificationKind::BookingCreated,
                "New booking",
                format!(
                    "{} booked ({} x{})",
                    current_user.username,
                    match created.item {
                        BookingItem::Combo(id) => format!("combo {id}"),
                        BookingItem::Service(id) => format!("service {id}"),
                    },
                    created.quantity
                ),
                Some(created.id),
            )
            .await;
    }

    Ok(Json(created))
}

/// GET /api/bookings/mine?status= - 我的预订
pub async fn list_mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(filter): Query<BookingFilter>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = booking::find_by_user(&state.pool, current_user.id, filter.status).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/host - 我条目上的预订 (host 视角)
pub async fn list_for_host(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = booking::find_by_host(&state.pool, current_user.id).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings?status= - 全量列表 (admin)
pub async fn list_all(
    State(state): State<ServerState>,
    Query(filter): Query<BookingFilter>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = booking::find_all(&state.pool, filter.status).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/:id - 单个预订 (owner / host / admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Booking>> {
    let found = find_booking(&state, id).await?;
    let host_id = item_host_id(&state, &found.item).await.unwrap_or(-1);
    if found.user_id != current_user.id && host_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::forbidden("Not a party to this booking"));
    }
    Ok(Json(found))
}

#[derive(Deserialize)]
pub struct ChangeStatusRequest {
    pub status: BookingStatus,
}

/// POST /api/bookings/:id/status - 状态迁移
///
/// | 迁移 | 谁 |
/// |------|-----|
/// | Pending → Confirmed | host / admin |
/// | Confirmed → Completed | host / admin (推进用户忠诚度) |
/// | Pending, Confirmed → Cancelled | owner / host / admin (释放优惠券名额) |
pub async fn change_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<ChangeStatusRequest>,
) -> AppResult<Json<Booking>> {
    let target = find_booking(&state, id).await?;
    let host_id = item_host_id(&state, &target.item).await.unwrap_or(-1);
    let is_host = host_id == current_user.id || current_user.is_admin();
    let is_owner = target.user_id == current_user.id;

    let changed = match req.status {
        BookingStatus::Confirmed => {
            if !is_host {
                return Err(AppError::forbidden("Only the host can confirm"));
            }
            booking::transition_status(
                &state.pool,
                id,
                BookingStatus::Confirmed,
                &[BookingStatus::Pending],
            )
            .await?
        }
        BookingStatus::Completed => {
            if !is_host {
                return Err(AppError::forbidden("Only the host can complete"));
            }
            let changed = booking::transition_status(
                &state.pool,
                id,
                BookingStatus::Completed,
                &[BookingStatus::Confirmed],
            )
            .await?;
            if changed {
                crate::db::repository::user::bump_completed_bookings(&state.pool, target.user_id)
                    .await?;
            }
            changed
        }
        BookingStatus::Cancelled => {
            if !is_owner && !is_host {
                return Err(AppError::forbidden("Not a party to this booking"));
            }
            booking::cancel(&state.pool, id).await?
        }
        BookingStatus::Pending => {
            return Err(AppError::business("Cannot transition back to PENDING"));
        }
    };

    if !changed {
        return Err(AppError::business(format!(
            "Booking is {} and cannot become {}",
            target.status.as_str(),
            req.status.as_str()
        )));
    }

    state
        .notifier
        .notify(
            target.user_id,
            NotificationKind::BookingStatus,
            "Booking update",
            format!("Booking is now {}", req.status.as_str()),
            Some(id),
        )
        .await;

    let updated = find_booking(&state, id).await?;
    Ok(Json(updated))
}

/// POST /api/bookings/:id/coupon - 应用优惠券 (仅 PENDING)
pub async fn apply_coupon(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<ApplyCouponRequest>,
) -> AppResult<Json<Booking>> {
    let target = find_booking(&state, id).await?;
    if target.user_id != current_user.id {
        return Err(AppError::forbidden("Not the owner of this booking"));
    }
    if target.status != BookingStatus::Pending {
        return Err(AppError::business("Only pending bookings can be modified"));
    }

    let found = coupon::find_by_code(&state.pool, &req.code)
        .await?
        .ok_or_else(|| AppError::business("Coupon code not found"))?;

    let now = shared::util::now_millis();
    pricing::evaluate_coupon(&found, &target.item, current_user.level, now)
        .map_err(|rejection| AppError::business(rejection.message()))?;

    let (discount_amount, new_total) = pricing::discount_for_booking(&target, &found);

    coupon::apply_to_booking(&state.pool, id, found.id, discount_amount, new_total)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::Validation(msg) => AppError::business(msg),
            crate::db::repository::RepoError::Duplicate(_) => {
                AppError::business("Coupon already applied to this booking")
            }
            other => other.into(),
        })?;

    tracing::info!(
        booking_id = id,
        coupon_id = found.id,
        discount = discount_amount,
        "Coupon applied"
    );

    state
        .notifier
        .notify(
            current_user.id,
            NotificationKind::CouponApplied,
            "Coupon applied",
            format!("{} saved {:.2}", found.code, discount_amount),
            Some(id),
        )
        .await;

    let updated = find_booking(&state, id).await?;
    Ok(Json(updated))
}

/// DELETE /api/bookings/:id/coupon - 移除优惠券 (仅 PENDING)
pub async fn remove_coupon(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Booking>> {
    let target = find_booking(&state, id).await?;
    if target.user_id != current_user.id {
        return Err(AppError::forbidden("Not the owner of this booking"));
    }
    if target.status != BookingStatus::Pending {
        return Err(AppError::business("Only pending bookings can be modified"));
    }

    let restored = pricing::restored_total(&target);
    let released = coupon::remove_from_booking(&state.pool, id, restored).await?;
    if released.is_none() {
        return Err(AppError::business("No coupon applied to this booking"));
    }

    tracing::info!(booking_id = id, "Coupon removed");

    let updated = find_booking(&state, id).await?;
    Ok(Json(updated))
}
