//! Quote orchestration
//!
//! 解析条目单价 → 小计 → 赠送服务 → 优惠券折扣 → 应付。
//! 只读；落库由预订仓库在事务内完成。

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::db::repository::{combo, coupon, service};
use crate::pricing::calculator::{discount_amount, payable, subtotal, to_decimal, to_f64};
use crate::pricing::evaluator::evaluate_coupon;
use crate::utils::{AppError, AppResult, validation};
use shared::models::{Booking, BookingCreate, BookingItem, BookingQuote, Coupon, CouponCheck};

/// 报价结果：各金额 + 解析出的优惠券 (落库时领取名额用)
#[derive(Debug, Clone)]
pub struct Quote {
    pub unit_price: f64,
    pub quantity: i64,
    pub subtotal: f64,
    pub bonus_price: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub coupon: Option<Coupon>,
}

impl From<&Quote> for BookingQuote {
    fn from(q: &Quote) -> Self {
        BookingQuote {
            unit_price: q.unit_price,
            quantity: q.quantity,
            subtotal: q.subtotal,
            bonus_price: q.bonus_price,
            discount_amount: q.discount_amount,
            total_amount: q.total_amount,
        }
    }
}

/// 条目单价：必须存在且在架
async fn resolve_unit_price(pool: &SqlitePool, item: &BookingItem) -> AppResult<f64> {
    match item {
        BookingItem::Service(id) => {
            let service = service::find_by_id(pool, *id)
                .await?
                .filter(|s| s.is_active)
                .ok_or_else(|| AppError::not_found(format!("Service {id}")))?;
            Ok(service.price)
        }
        BookingItem::Combo(id) => {
            let combo = combo::find_by_id(pool, *id)
                .await?
                .filter(|c| c.is_active)
                .ok_or_else(|| AppError::not_found(format!("Combo {id}")))?;
            Ok(combo.price)
        }
    }
}

/// 赠送服务价格 (加一次，不乘数量)
async fn resolve_bonus_price(pool: &SqlitePool, bonus_service_id: Option<i64>) -> AppResult<f64> {
    let Some(id) = bonus_service_id else {
        return Ok(0.0);
    };
    let bonus = service::find_by_id(pool, id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| AppError::not_found(format!("Bonus service {id}")))?;
    Ok(bonus.price)
}

/// Build a quote for a booking request. Coupon failures abort with the
/// structured rejection message (422).
pub async fn build_quote(
    pool: &SqlitePool,
    user_level: i64,
    request: &BookingCreate,
) -> AppResult<Quote> {
    validation::validate_quantity(request.quantity)?;

    let unit_price = resolve_unit_price(pool, &request.item).await?;
    let bonus_price = resolve_bonus_price(pool, request.bonus_service_id).await?;

    let sub = subtotal(unit_price, request.quantity);
    let bonus = to_decimal(bonus_price);

    let (discount, applied_coupon) = match &request.coupon_code {
        None => (Decimal::ZERO, None),
        Some(code) => {
            let coupon = coupon::find_by_code(pool, code)
                .await?
                .ok_or_else(|| AppError::business("Coupon code not found"))?;
            let now = shared::util::now_millis();
            evaluate_coupon(&coupon, &request.item, user_level, now)
                .map_err(|rejection| AppError::business(rejection.message()))?;
            let discount = discount_amount(&coupon.discount, sub + bonus);
            (discount, Some(coupon))
        }
    };

    let total = payable(sub, bonus, discount);

    Ok(Quote {
        unit_price,
        quantity: request.quantity,
        subtotal: to_f64(sub),
        bonus_price,
        discount_amount: to_f64(discount),
        total_amount: to_f64(total),
        coupon: applied_coupon,
    })
}

/// 给既有预订算一张券的折扣 (apply-coupon 路径)
pub fn discount_for_booking(booking: &Booking, coupon: &Coupon) -> (f64, f64) {
    let base = subtotal(booking.unit_price, booking.quantity) + to_decimal(booking.bonus_price);
    let discount = discount_amount(&coupon.discount, base);
    let total = payable(base, Decimal::ZERO, discount);
    (to_f64(discount), to_f64(total))
}

/// 移除优惠券后的应付金额
pub fn restored_total(booking: &Booking) -> f64 {
    let base = subtotal(booking.unit_price, booking.quantity) + to_decimal(booking.bonus_price);
    to_f64(base)
}

/// 校验端点：给定券码、条目和数量，报告能否使用及折扣额
pub async fn check_coupon(
    pool: &SqlitePool,
    user_level: i64,
    code: &str,
    item: &BookingItem,
    quantity: i64,
) -> AppResult<CouponCheck> {
    validation::validate_quantity(quantity)?;

    let Some(coupon) = coupon::find_by_code(pool, code).await? else {
        return Ok(CouponCheck {
            usable: false,
            reason: Some(shared::models::CouponRejection::NotFound),
            discount_amount: None,
        });
    };

    let now = shared::util::now_millis();
    match evaluate_coupon(&coupon, item, user_level, now) {
        Err(rejection) => Ok(CouponCheck {
            usable: false,
            reason: Some(rejection),
            discount_amount: None,
        }),
        Ok(()) => {
            let unit_price = resolve_unit_price(pool, item).await?;
            let amount = subtotal(unit_price, quantity);
            let discount = discount_amount(&coupon.discount, amount);
            Ok(CouponCheck {
                usable: true,
                reason: None,
                discount_amount: Some(to_f64(discount)),
            })
        }
    }
}
