//! Money calculation using rust_decimal for precision
//!
//! All arithmetic runs on `Decimal` internally and converts to `f64`
//! only for storage/serialization. Rounding is 2 dp, half-up.

use rust_decimal::prelude::*;
use shared::models::Discount;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// 小计 = 单价 × 数量
pub fn subtotal(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Discount yielded by a coupon on `amount`:
/// - `Percent(p)` → amount × p / 100
/// - `Fixed(f)`   → min(f, amount), so the payable never goes negative
pub fn discount_amount(discount: &Discount, amount: Decimal) -> Decimal {
    let raw = match discount {
        Discount::Percent(p) => amount * to_decimal(*p) / Decimal::from(100),
        Discount::Fixed(f) => to_decimal(*f).min(amount),
    };
    raw.max(Decimal::ZERO)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// 应付 = max(小计 + 赠送服务 − 折扣, 0)
pub fn payable(subtotal: Decimal, bonus: Decimal, discount: Decimal) -> Decimal {
    (subtotal + bonus - discount).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_beats_f64_accumulation() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn subtotal_is_unit_times_quantity() {
        assert_eq!(to_f64(subtotal(10.99, 3)), 32.97);
        assert_eq!(to_f64(subtotal(0.0, 5)), 0.0);
    }

    #[test]
    fn percent_discount_is_proportional() {
        // A × P / 100
        let d = discount_amount(&Discount::Percent(15.0), to_decimal(200.0));
        assert_eq!(to_f64(d), 30.0);

        // Tricky percentage rounds half-up to 2 dp: 100 × 33.33% = 33.33
        let d = discount_amount(&Discount::Percent(33.33), to_decimal(100.0));
        assert_eq!(to_f64(d), 33.33);

        // Midpoint case: 12.345 → 12.35
        let d = discount_amount(&Discount::Percent(10.0), to_decimal(123.45));
        assert_eq!(to_f64(d), 12.35);
    }

    #[test]
    fn fixed_discount_is_capped_at_amount() {
        let d = discount_amount(&Discount::Fixed(50.0), to_decimal(30.0));
        assert_eq!(to_f64(d), 30.0);

        let d = discount_amount(&Discount::Fixed(20.0), to_decimal(30.0));
        assert_eq!(to_f64(d), 20.0);
    }

    #[test]
    fn payable_never_negative() {
        let total = payable(to_decimal(10.0), Decimal::ZERO, to_decimal(25.0));
        assert_eq!(to_f64(total), 0.0);

        let total = payable(to_decimal(100.0), to_decimal(5.0), to_decimal(30.0));
        assert_eq!(to_f64(total), 75.0);
    }

    #[test]
    fn hundred_percent_discount_zeroes_the_total() {
        let amount = to_decimal(59.9);
        let d = discount_amount(&Discount::Percent(100.0), amount);
        assert_eq!(to_f64(payable(amount, Decimal::ZERO, d)), 0.0);
    }
}
