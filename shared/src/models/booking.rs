//! Booking Model

use serde::{Deserialize, Serialize};

/// What a booking is for: exactly one of a combo or a single service.
///
/// 存储为 (item_type, item_id) 列对；"两个可空外键"的未定义状态
/// 在类型层面不可表示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingItem {
    Combo(i64),
    Service(i64),
}

impl BookingItem {
    pub fn encode(&self) -> (&'static str, i64) {
        match self {
            BookingItem::Combo(id) => ("COMBO", *id),
            BookingItem::Service(id) => ("SERVICE", *id),
        }
    }

    pub fn decode(kind: &str, id: i64) -> Result<Self, UnknownItemType> {
        match kind {
            "COMBO" => Ok(BookingItem::Combo(id)),
            "SERVICE" => Ok(BookingItem::Service(id)),
            other => Err(UnknownItemType(other.to_string())),
        }
    }

    /// Combo id if this is a combo booking (coupon scope checks)
    pub fn combo_id(&self) -> Option<i64> {
        match self {
            BookingItem::Combo(id) => Some(*id),
            BookingItem::Service(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown booking item type: {0}")]
pub struct UnknownItemType(pub String);

/// Booking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Booking entity (预订)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub item: BookingItem,
    pub quantity: i64,
    /// Unit price captured at booking time
    pub unit_price: f64,
    pub bonus_service_id: Option<i64>,
    /// Bonus price captured at booking time (added once, not per unit)
    pub bonus_price: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    pub item: BookingItem,
    pub quantity: i64,
    pub bonus_service_id: Option<i64>,
    pub coupon_code: Option<String>,
    pub note: Option<String>,
}

/// Quote response (no persistence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingQuote {
    pub unit_price: f64,
    pub quantity: i64,
    pub subtotal: f64,
    pub bonus_price: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
}

/// Coupon application payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Booking list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
}
