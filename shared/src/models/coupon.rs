//! Coupon Model
//!
//! 折扣是一个带标签的和类型：百分比 XOR 固定金额。
//! 两个可空列的"都空/都填"状态在类型层面不可表示。

use serde::{Deserialize, Serialize};

/// Discount variant: percentage of the amount, or a fixed cut
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Discount {
    /// 0 < p <= 100
    Percent(f64),
    /// amount > 0, capped at the charged amount
    Fixed(f64),
}

impl Discount {
    /// Storage encoding: (discount_type, discount_value) column pair
    pub fn encode(&self) -> (&'static str, f64) {
        match self {
            Discount::Percent(p) => ("PERCENT", *p),
            Discount::Fixed(f) => ("FIXED", *f),
        }
    }

    pub fn decode(kind: &str, value: f64) -> Result<Self, UnknownDiscountType> {
        match kind {
            "PERCENT" => Ok(Discount::Percent(value)),
            "FIXED" => Ok(Discount::Fixed(value)),
            other => Err(UnknownDiscountType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown discount type: {0}")]
pub struct UnknownDiscountType(pub String);

/// Coupon entity (优惠券)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    /// 区分大小写的唯一兑换码
    pub code: String,
    pub host_id: i64,
    pub discount: Discount,
    /// None = unlimited
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    pub is_active: bool,
    /// Unix millis; None = never expires
    pub expires_at: Option<i64>,
    /// 限定只能用于某个套餐
    pub combo_scope: Option<i64>,
    pub min_user_level: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub code: String,
    pub discount: Discount,
    pub usage_limit: Option<i64>,
    pub expires_at: Option<i64>,
    pub combo_scope: Option<i64>,
    pub min_user_level: Option<i64>,
}

/// Update coupon payload (code and discount are immutable once issued)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUpdate {
    pub usage_limit: Option<i64>,
    pub expires_at: Option<i64>,
    pub is_active: Option<bool>,
    pub min_user_level: Option<i64>,
}

/// Why a coupon cannot be applied.
///
/// The upstream system collapsed every case to a bare boolean; keeping the
/// cases apart costs nothing and the client can finally say *why*.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponRejection {
    NotFound,
    Inactive,
    Expired,
    LimitReached,
    ScopeMismatch,
    LevelTooLow,
}

impl CouponRejection {
    pub fn message(&self) -> &'static str {
        match self {
            CouponRejection::NotFound => "Coupon code not found",
            CouponRejection::Inactive => "Coupon is not active",
            CouponRejection::Expired => "Coupon has expired",
            CouponRejection::LimitReached => "Coupon usage limit reached",
            CouponRejection::ScopeMismatch => "Coupon does not apply to this item",
            CouponRejection::LevelTooLow => "User level too low for this coupon",
        }
    }
}

/// Validation endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCheck {
    pub usable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CouponRejection>,
    /// Discount the coupon would yield on the given amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
}
