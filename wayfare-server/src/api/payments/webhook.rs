//! Payment gateway webhook handler
//!
//! POST /api/payments/webhook — raw body for HMAC signature verification.
//!
//! 幂等：事件 ID 先 INSERT (ON CONFLICT DO NOTHING)，rows_affected == 0
//! 即重复事件直接 200。

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::core::ServerState;
use crate::db::repository::{booking, payment, upgrade};
use shared::models::{BookingStatus, NotificationKind, Payment, PaymentKind, PaymentStatus};

/// Handle incoming gateway webhook events
pub async fn handle_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Signature header
    let sig_header = match headers
        .get("x-gateway-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(s) => s,
        None => {
            tracing::warn!("Missing x-gateway-signature header");
            return StatusCode::BAD_REQUEST;
        }
    };

    // 2. Verify signature over the raw body
    if let Err(e) = state.gateway.verify_webhook_signature(&body, sig_header) {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    // 3. Parse JSON event
    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = match event["id"].as_str() {
        Some(id) => id,
        None => {
            tracing::warn!("Webhook event missing id");
            return StatusCode::BAD_REQUEST;
        }
    };
    tracing::info!(event_id = event_id, event_type = event_type, "Received gateway webhook");

    // 4. Idempotency: INSERT first, check rows_affected (no TOCTOU race)
    match payment::record_webhook_event(&state.pool, event_id, event_type).await {
        Ok(false) => {
            tracing::info!(event_id = event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(error = %e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        Ok(true) => {} // New event, proceed
    }

    // 5. Resolve the payment by our reference
    let gateway_ref = match event["data"]["reference"].as_str() {
        Some(r) => r,
        None => {
            tracing::warn!(event_id = event_id, "Webhook event missing data.reference");
            return StatusCode::OK;
        }
    };
    let target = match payment::find_by_gateway_ref(&state.pool, gateway_ref).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            tracing::warn!(gateway_ref = gateway_ref, "Webhook for unknown payment");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(error = %e, "DB error resolving payment");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    let method = event["data"]["method"].as_str();

    // 6. Dispatch by event type
    match event_type {
        "payment.succeeded" => settle(&state, &target, PaymentStatus::Succeeded, method).await,
        "payment.failed" => settle(&state, &target, PaymentStatus::Failed, method).await,
        "payment.cancelled" => settle(&state, &target, PaymentStatus::Cancelled, method).await,
        _ => {
            tracing::debug!(event_type = event_type, "Unhandled webhook event type");
            StatusCode::OK
        }
    }
}

/// 落定支付状态并驱动下游：预订确认 / 升级费到账 / 通知付款人
async fn settle(
    state: &ServerState,
    target: &Payment,
    status: PaymentStatus,
    method: Option<&str>,
) -> StatusCode {
    let changed = match payment::settle(&state.pool, target.id, status, method).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, payment_id = target.id, "Failed to settle payment");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    if !changed {
        // 已不是 PENDING：晚到或乱序的事件
        tracing::info!(payment_id = target.id, "Payment already settled, ignoring");
        return StatusCode::OK;
    }

    if status == PaymentStatus::Succeeded {
        match target.kind {
            PaymentKind::Booking => {
                if let Some(booking_id) = target.booking_id {
                    match booking::transition_status(
                        &state.pool,
                        booking_id,
                        BookingStatus::Confirmed,
                        &[BookingStatus::Pending],
                    )
                    .await
                    {
                        Ok(true) => {
                            tracing::info!(booking_id = booking_id, "Booking confirmed by payment")
                        }
                        Ok(false) => {} // already confirmed by the host
                        Err(e) => {
                            tracing::error!(error = %e, booking_id = booking_id, "Failed to confirm booking")
                        }
                    }
                }
            }
            PaymentKind::Upgrade => {
                if let Some(request_id) = target.upgrade_request_id {
                    if let Err(e) = upgrade::mark_fee_paid(&state.pool, request_id).await {
                        tracing::error!(error = %e, request_id = request_id, "Failed to mark fee paid");
                    }
                }
            }
        }
    }

    let outcome = match status {
        PaymentStatus::Succeeded => "succeeded",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Cancelled => "cancelled",
        PaymentStatus::Pending => "pending",
    };
    state
        .notifier
        .notify(
            target.payer_id,
            NotificationKind::PaymentResult,
            "Payment update",
            format!("Payment of {:.2} {}", target.amount, outcome),
            Some(target.id),
        )
        .await;

    StatusCode::OK
}
