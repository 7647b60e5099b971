//! Payment Checkout Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::core::config::{UPGRADE_FEE_AGENCY, UPGRADE_FEE_HOST};
use crate::db::repository::{booking, payment, upgrade};
use crate::utils::{AppError, AppResult};
use shared::models::{
    BookingStatus, CheckoutRequest, CheckoutResponse, Payment, Role, UpgradeStatus,
};

/// POST /api/payments/checkout - 创建支付并取回网关收银台链接
pub async fn checkout(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let gateway_ref = Uuid::new_v4().to_string();

    let (created, description) = match req {
        CheckoutRequest::Booking(booking_id) => {
            let target = booking::find_by_id(&state.pool, booking_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Booking {booking_id}")))?;
            if target.user_id != current_user.id {
                return Err(AppError::forbidden("Not the owner of this booking"));
            }
            if !matches!(target.status, BookingStatus::Pending | BookingStatus::Confirmed) {
                return Err(AppError::business("Booking is not payable in its current state"));
            }
            if target.total_amount <= 0.0 {
                return Err(AppError::business("Nothing to pay for this booking"));
            }

            let created = payment::create_for_booking(
                &state.pool,
                booking_id,
                current_user.id,
                target.total_amount,
                &gateway_ref,
            )
            .await?;
            (created, format!("Wayfare booking {booking_id}"))
        }
        CheckoutRequest::Upgrade(request_id) => {
            let target = upgrade::find_by_id(&state.pool, request_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Upgrade request {request_id}")))?;
            if target.user_id != current_user.id {
                return Err(AppError::forbidden("Not the owner of this request"));
            }
            if target.status != UpgradeStatus::Pending {
                return Err(AppError::business("Upgrade request is already reviewed"));
            }
            if target.fee_paid {
                return Err(AppError::business("Upgrade fee already paid"));
            }

            let fee = match target.target_role {
                Role::Host => UPGRADE_FEE_HOST,
                Role::Agency => UPGRADE_FEE_AGENCY,
                // 仓库层 CHECK 约束保证不会出现
                _ => return Err(AppError::internal("Invalid upgrade target role")),
            };

            let created = payment::create_for_upgrade(
                &state.pool,
                request_id,
                current_user.id,
                fee,
                &gateway_ref,
            )
            .await?;
            (created, format!("Wayfare upgrade fee ({})", target.target_role.as_str()))
        }
    };

    let checkout_url = state
        .gateway
        .create_payment_link(&gateway_ref, created.amount, &description)
        .await
        .map_err(|e| AppError::internal(format!("Gateway checkout failed: {e}")))?;

    tracing::info!(
        payment_id = created.id,
        amount = created.amount,
        "Checkout created"
    );

    Ok(Json(CheckoutResponse {
        payment_id: created.id,
        checkout_url,
    }))
}

/// GET /api/payments/mine - 我的支付记录
pub async fn list_mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Payment>>> {
    let payments = payment::find_by_payer(&state.pool, current_user.id).await?;
    Ok(Json(payments))
}

/// GET /api/payments/:id - 单条支付 (payer / admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Payment>> {
    let found = payment::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payment {id}")))?;
    if found.payer_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::forbidden("Not a party to this payment"));
    }
    Ok(Json(found))
}
