//! Payment Model

use serde::{Deserialize, Serialize};

/// What a payment is for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentKind {
    /// 预订付款 (booking_id set)
    Booking,
    /// 资质升级费 (upgrade_request_id set)
    Upgrade,
}

/// Payment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

/// Payment entity (支付记录)
///
/// 一个预订可以有多条支付记录（失败重试）；升级费支付没有 booking 引用。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub kind: PaymentKind,
    pub booking_id: Option<i64>,
    pub upgrade_request_id: Option<i64>,
    pub payer_id: i64,
    pub amount: f64,
    /// Gateway method string, e.g. "card" / "bank_transfer"
    pub method: Option<String>,
    pub status: PaymentStatus,
    /// Gateway-side order reference (unique)
    pub gateway_ref: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Checkout creation payload: pay for a booking or an upgrade request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "target", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutRequest {
    Booking(i64),
    Upgrade(i64),
}

/// Checkout creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub payment_id: i64,
    pub checkout_url: String,
}
