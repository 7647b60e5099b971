//! 优惠券核心不变量的端到端测试 (真实 SQLite 文件)
//!
//! - 应用→移除恢复 usage_count 并删除 (booking, coupon) 行
//! - 限额耗尽被拒绝
//! - 并发抢最后一个名额只有一个成功

use sqlx::SqlitePool;
use tempfile::TempDir;

use shared::models::{
    BookingItem, Coupon, CouponCreate, Discount, Role, Service, ServiceCreate, User,
};
use wayfare_server::db::DbService;
use wayfare_server::db::repository::{booking, coupon, service, user};
use wayfare_server::pricing;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("wayfare-test.db");
    let db = DbService::new(db_path.to_str().unwrap())
        .await
        .expect("database init");
    (dir, db.pool)
}

async fn seed_host(pool: &SqlitePool, name: &str) -> User {
    let created = user::create(
        pool,
        name,
        &format!("{name}@example.com"),
        "$argon2-not-a-real-hash",
        name,
    )
    .await
    .expect("create user");
    user::set_role(pool, created.id, Role::Host)
        .await
        .expect("set role");
    user::find_by_id(pool, created.id).await.unwrap().unwrap()
}

async fn seed_tourist(pool: &SqlitePool, name: &str) -> User {
    user::create(
        pool,
        name,
        &format!("{name}@example.com"),
        "$argon2-not-a-real-hash",
        name,
    )
    .await
    .expect("create user")
}

async fn seed_service(pool: &SqlitePool, host_id: i64, price: f64) -> Service {
    service::create(
        pool,
        host_id,
        ServiceCreate {
            title: "City walking tour".to_string(),
            description: None,
            category: Some("tour".to_string()),
            price,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .expect("create service")
}

async fn seed_coupon(
    pool: &SqlitePool,
    host_id: i64,
    code: &str,
    discount: Discount,
    usage_limit: Option<i64>,
) -> Coupon {
    coupon::create(
        pool,
        host_id,
        CouponCreate {
            code: code.to_string(),
            discount,
            usage_limit,
            expires_at: None,
            combo_scope: None,
            min_user_level: None,
        },
    )
    .await
    .expect("create coupon")
}

async fn seed_booking(pool: &SqlitePool, user_id: i64, service_id: i64, unit_price: f64) -> i64 {
    let created = booking::create(
        pool,
        booking::NewBooking {
            user_id,
            item: BookingItem::Service(service_id),
            quantity: 2,
            unit_price,
            bonus_service_id: None,
            bonus_price: 0.0,
            discount_amount: 0.0,
            total_amount: unit_price * 2.0,
            note: None,
            coupon_id: None,
        },
    )
    .await
    .expect("create booking");
    created.id
}

#[tokio::test]
async fn apply_then_remove_restores_usage_count() {
    let (_dir, pool) = setup().await;
    let host = seed_host(&pool, "host1").await;
    let tourist = seed_tourist(&pool, "alice").await;
    let svc = seed_service(&pool, host.id, 100.0).await;
    let issued = seed_coupon(&pool, host.id, "SAVE-20", Discount::Percent(20.0), Some(5)).await;
    let booking_id = seed_booking(&pool, tourist.id, svc.id, 100.0).await;

    // Apply: 200 × 20% = 40 discount
    let target = booking::find_by_id(&pool, booking_id).await.unwrap().unwrap();
    let (discount, new_total) = pricing::discount_for_booking(&target, &issued);
    assert_eq!(discount, 40.0);
    assert_eq!(new_total, 160.0);

    coupon::apply_to_booking(&pool, booking_id, issued.id, discount, new_total)
        .await
        .expect("apply coupon");

    let after_apply = coupon::find_by_id(&pool, issued.id).await.unwrap().unwrap();
    assert_eq!(after_apply.usage_count, 1);
    assert_eq!(
        coupon::applied_coupon_id(&pool, booking_id).await.unwrap(),
        Some(issued.id)
    );
    let booked = booking::find_by_id(&pool, booking_id).await.unwrap().unwrap();
    assert_eq!(booked.discount_amount, 40.0);
    assert_eq!(booked.total_amount, 160.0);

    // Second apply on the same booking is rejected (one coupon per booking)
    let err = coupon::apply_to_booking(&pool, booking_id, issued.id, discount, new_total)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already has a coupon"));

    // Remove: usage count back to prior value, join row gone, totals restored
    let restored = pricing::restored_total(&booked);
    let released = coupon::remove_from_booking(&pool, booking_id, restored)
        .await
        .expect("remove coupon");
    assert_eq!(released, Some(issued.id));

    let after_remove = coupon::find_by_id(&pool, issued.id).await.unwrap().unwrap();
    assert_eq!(after_remove.usage_count, 0);
    assert_eq!(coupon::applied_coupon_id(&pool, booking_id).await.unwrap(), None);
    let booked = booking::find_by_id(&pool, booking_id).await.unwrap().unwrap();
    assert_eq!(booked.discount_amount, 0.0);
    assert_eq!(booked.total_amount, 200.0);

    // Removing again reports nothing applied
    let released = coupon::remove_from_booking(&pool, booking_id, restored)
        .await
        .unwrap();
    assert_eq!(released, None);
}

#[tokio::test]
async fn exhausted_coupon_cannot_be_claimed() {
    let (_dir, pool) = setup().await;
    let host = seed_host(&pool, "host2").await;
    let tourist = seed_tourist(&pool, "bob").await;
    let svc = seed_service(&pool, host.id, 50.0).await;
    let issued = seed_coupon(&pool, host.id, "ONCE-ONLY", Discount::Fixed(10.0), Some(1)).await;

    // Consume the single slot
    let first = seed_booking(&pool, tourist.id, svc.id, 50.0).await;
    let target = booking::find_by_id(&pool, first).await.unwrap().unwrap();
    let (discount, total) = pricing::discount_for_booking(&target, &issued);
    coupon::apply_to_booking(&pool, first, issued.id, discount, total)
        .await
        .expect("first apply");

    // usage_count == usage_limit → claim must fail
    let second = seed_booking(&pool, tourist.id, svc.id, 50.0).await;
    let err = coupon::apply_to_booking(&pool, second, issued.id, discount, total)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("usage limit"));

    let exhausted = coupon::find_by_id(&pool, issued.id).await.unwrap().unwrap();
    assert_eq!(exhausted.usage_count, 1);
}

#[tokio::test]
async fn concurrent_applies_cannot_overshoot_the_limit() {
    let (_dir, pool) = setup().await;
    let host = seed_host(&pool, "host3").await;
    let svc = seed_service(&pool, host.id, 80.0).await;
    let issued = seed_coupon(&pool, host.id, "LAST-SLOT", Discount::Percent(50.0), Some(1)).await;

    // 8 个游客同时带着同一张券下单，只有一个能领到最后的名额
    let mut tourists = Vec::new();
    for i in 0..8 {
        tourists.push(seed_tourist(&pool, &format!("racer{i}")).await);
    }

    let mut handles = Vec::new();
    for tourist in &tourists {
        let pool = pool.clone();
        let user_id = tourist.id;
        let service_id = svc.id;
        let coupon_id = issued.id;
        handles.push(tokio::spawn(async move {
            booking::create(
                &pool,
                booking::NewBooking {
                    user_id,
                    item: BookingItem::Service(service_id),
                    quantity: 1,
                    unit_price: 80.0,
                    bonus_service_id: None,
                    bonus_price: 0.0,
                    discount_amount: 40.0,
                    total_amount: 40.0,
                    note: None,
                    coupon_id: Some(coupon_id),
                },
            )
            .await
            .is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("task join") {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one concurrent apply may win the last slot");

    let final_state = coupon::find_by_id(&pool, issued.id).await.unwrap().unwrap();
    assert_eq!(final_state.usage_count, 1, "usage count must not overshoot the limit");

    // 失败方的预订必须整体回滚，不能留下无券价格的半成品
    let (bookings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM booking")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(bookings, 1);
}

#[tokio::test]
async fn quote_rejects_expired_and_scoped_coupons() {
    let (_dir, pool) = setup().await;
    let host = seed_host(&pool, "host4").await;
    let tourist = seed_tourist(&pool, "carol").await;
    let svc = seed_service(&pool, host.id, 60.0).await;

    // Expired coupon
    coupon::create(
        &pool,
        host.id,
        CouponCreate {
            code: "EXPIRED-1".to_string(),
            discount: Discount::Percent(10.0),
            usage_limit: None,
            expires_at: Some(shared::util::now_millis() - 1000),
            combo_scope: None,
            min_user_level: None,
        },
    )
    .await
    .unwrap();

    let request = shared::models::BookingCreate {
        item: BookingItem::Service(svc.id),
        quantity: 1,
        bonus_service_id: None,
        coupon_code: Some("EXPIRED-1".to_string()),
        note: None,
    };
    let err = pricing::build_quote(&pool, tourist.level, &request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("expired"));

    // Combo-scoped coupon never matches a service booking
    coupon::create(
        &pool,
        host.id,
        CouponCreate {
            code: "COMBO-ONLY".to_string(),
            discount: Discount::Fixed(5.0),
            usage_limit: None,
            expires_at: None,
            combo_scope: Some(999),
            min_user_level: None,
        },
    )
    .await
    .unwrap();

    let request = shared::models::BookingCreate {
        coupon_code: Some("COMBO-ONLY".to_string()),
        ..request
    };
    let err = pricing::build_quote(&pool, tourist.level, &request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not apply"));
}
