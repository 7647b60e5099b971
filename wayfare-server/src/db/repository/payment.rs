//! Payment Repository
//!
//! 独立 payment 表，预订付款与升级费共用；gateway_ref UNIQUE 保证
//! 网关侧引用幂等。

use super::RepoResult;
use shared::models::{Payment, PaymentKind, PaymentStatus};
use sqlx::SqlitePool;

const PAYMENT_SELECT: &str = "SELECT id, kind, booking_id, upgrade_request_id, payer_id, amount, method, status, gateway_ref, created_at, updated_at FROM payment";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("{} WHERE id = ?", PAYMENT_SELECT);
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_gateway_ref(pool: &SqlitePool, gateway_ref: &str) -> RepoResult<Option<Payment>> {
    let sql = format!("{} WHERE gateway_ref = ?", PAYMENT_SELECT);
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(gateway_ref)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_payer(pool: &SqlitePool, payer_id: i64) -> RepoResult<Vec<Payment>> {
    let sql = format!("{} WHERE payer_id = ? ORDER BY created_at DESC", PAYMENT_SELECT);
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(payer_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 预订付款记录
pub async fn create_for_booking(
    pool: &SqlitePool,
    booking_id: i64,
    payer_id: i64,
    amount: f64,
    gateway_ref: &str,
) -> RepoResult<Payment> {
    create(pool, PaymentKind::Booking, Some(booking_id), None, payer_id, amount, gateway_ref).await
}

/// 升级费付款记录
pub async fn create_for_upgrade(
    pool: &SqlitePool,
    upgrade_request_id: i64,
    payer_id: i64,
    amount: f64,
    gateway_ref: &str,
) -> RepoResult<Payment> {
    create(
        pool,
        PaymentKind::Upgrade,
        None,
        Some(upgrade_request_id),
        payer_id,
        amount,
        gateway_ref,
    )
    .await
}

async fn create(
    pool: &SqlitePool,
    kind: PaymentKind,
    booking_id: Option<i64>,
    upgrade_request_id: Option<i64>,
    payer_id: i64,
    amount: f64,
    gateway_ref: &str,
) -> RepoResult<Payment> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO payment (id, kind, booking_id, upgrade_request_id, payer_id, amount, method, status, gateway_ref, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 'PENDING', ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(kind)
    .bind(booking_id)
    .bind(upgrade_request_id)
    .bind(payer_id)
    .bind(amount)
    .bind(gateway_ref)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create payment".into()))
}

/// Webhook 驱动的状态落定。只允许 PENDING → 终态，重复事件无副作用。
pub async fn settle(
    pool: &SqlitePool,
    id: i64,
    status: PaymentStatus,
    method: Option<&str>,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE payment SET status = ?1, method = COALESCE(?2, method), updated_at = ?3 WHERE id = ?4 AND status = 'PENDING'",
    )
    .bind(status)
    .bind(method)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Webhook 幂等表：INSERT OR IGNORE + rows_affected 判重。
pub async fn record_webhook_event(
    pool: &SqlitePool,
    event_id: &str,
    event_type: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO processed_webhook_event (event_id, event_type, processed_at) VALUES (?1, ?2, ?3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
