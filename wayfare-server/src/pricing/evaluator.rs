//! Coupon eligibility checks
//!
//! 检查顺序固定：active → expiry → usage limit → scope → level。
//! 每个失败映射到一个结构化 [`CouponRejection`]，而不是压扁成布尔。
//!
//! 这里的 usage limit 检查只是预检；真正的防并发保证在仓库层的
//! 条件 UPDATE 领取。

use shared::models::{BookingItem, Coupon, CouponRejection};

/// Evaluate whether `coupon` is usable now, for `item`, by a user at
/// `user_level`. Lookup misses are the caller's `NotFound`.
pub fn evaluate_coupon(
    coupon: &Coupon,
    item: &BookingItem,
    user_level: i64,
    now_millis: i64,
) -> Result<(), CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }

    if let Some(expires_at) = coupon.expires_at
        && expires_at < now_millis
    {
        return Err(CouponRejection::Expired);
    }

    if let Some(limit) = coupon.usage_limit
        && coupon.usage_count >= limit
    {
        return Err(CouponRejection::LimitReached);
    }

    // 套餐限定券：服务类预订永远不匹配
    if let Some(scope) = coupon.combo_scope
        && item.combo_id() != Some(scope)
    {
        return Err(CouponRejection::ScopeMismatch);
    }

    if user_level < coupon.min_user_level {
        return Err(CouponRejection::LevelTooLow);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Discount;
    use shared::util::now_millis;

    fn make_coupon() -> Coupon {
        let now = now_millis();
        Coupon {
            id: 1,
            code: "TEST-10".to_string(),
            host_id: 7,
            discount: Discount::Percent(10.0),
            usage_limit: None,
            usage_count: 0,
            is_active: true,
            expires_at: None,
            combo_scope: None,
            min_user_level: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_coupon_is_usable() {
        let coupon = make_coupon();
        assert!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now_millis()).is_ok()
        );
    }

    #[test]
    fn inactive_is_rejected() {
        let coupon = Coupon {
            is_active: false,
            ..make_coupon()
        };
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now_millis()),
            Err(CouponRejection::Inactive)
        );
    }

    #[test]
    fn past_expiry_is_rejected() {
        let now = now_millis();
        let coupon = Coupon {
            expires_at: Some(now - 1),
            ..make_coupon()
        };
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now),
            Err(CouponRejection::Expired)
        );
        // Boundary: expiring exactly now is still valid
        let coupon = Coupon {
            expires_at: Some(now),
            ..make_coupon()
        };
        assert!(evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now).is_ok());
    }

    #[test]
    fn exhausted_usage_is_rejected() {
        let coupon = Coupon {
            usage_limit: Some(3),
            usage_count: 3,
            ..make_coupon()
        };
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now_millis()),
            Err(CouponRejection::LimitReached)
        );
    }

    #[test]
    fn one_slot_left_is_usable() {
        let coupon = Coupon {
            usage_limit: Some(3),
            usage_count: 2,
            ..make_coupon()
        };
        assert!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now_millis()).is_ok()
        );
    }

    #[test]
    fn combo_scope_must_match() {
        let coupon = Coupon {
            combo_scope: Some(42),
            ..make_coupon()
        };
        assert!(
            evaluate_coupon(&coupon, &BookingItem::Combo(42), 1, now_millis()).is_ok()
        );
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Combo(43), 1, now_millis()),
            Err(CouponRejection::ScopeMismatch)
        );
        // A service booking never matches a combo-scoped coupon
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Service(42), 1, now_millis()),
            Err(CouponRejection::ScopeMismatch)
        );
    }

    #[test]
    fn level_gate() {
        let coupon = Coupon {
            min_user_level: 3,
            ..make_coupon()
        };
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 2, now_millis()),
            Err(CouponRejection::LevelTooLow)
        );
        assert!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 3, now_millis()).is_ok()
        );
    }

    #[test]
    fn check_order_reports_first_failure() {
        // Inactive AND expired AND exhausted → Inactive wins (documented order)
        let now = now_millis();
        let coupon = Coupon {
            is_active: false,
            expires_at: Some(now - 1),
            usage_limit: Some(1),
            usage_count: 1,
            ..make_coupon()
        };
        assert_eq!(
            evaluate_coupon(&coupon, &BookingItem::Service(5), 1, now),
            Err(CouponRejection::Inactive)
        );
    }
}
