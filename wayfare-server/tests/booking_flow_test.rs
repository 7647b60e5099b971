//! 预订全流程测试：报价 → 创建 → 状态流转 → 支付落定 → 评价

use sqlx::SqlitePool;
use tempfile::TempDir;

use shared::models::{
    BookingCreate, BookingItem, BookingStatus, ComboCreate, ComboItemInput, CouponCreate, Discount,
    PaymentStatus, Role, ServiceCreate, User,
};
use wayfare_server::db::DbService;
use wayfare_server::db::repository::{booking, combo, coupon, payment, review, service, user};
use wayfare_server::pricing;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("wayfare-test.db");
    let db = DbService::new(db_path.to_str().unwrap())
        .await
        .expect("database init");
    (dir, db.pool)
}

async fn seed_user(pool: &SqlitePool, name: &str, role: Role) -> User {
    let created = user::create(
        pool,
        name,
        &format!("{name}@example.com"),
        "$argon2-not-a-real-hash",
        name,
    )
    .await
    .expect("create user");
    if role != Role::Tourist {
        user::set_role(pool, created.id, role).await.expect("set role");
    }
    user::find_by_id(pool, created.id).await.unwrap().unwrap()
}

#[tokio::test]
async fn quote_math_with_bonus_and_coupon() {
    let (_dir, pool) = setup().await;
    let host = seed_user(&pool, "host", Role::Host).await;
    let tourist = seed_user(&pool, "alice", Role::Tourist).await;

    let main_svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Kayak rental".into(),
            description: None,
            category: None,
            price: 100.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();
    let bonus_svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Photo package".into(),
            description: None,
            category: None,
            price: 20.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();
    coupon::create(
        &pool,
        host.id,
        CouponCreate {
            code: "TEN-OFF".into(),
            discount: Discount::Percent(10.0),
            usage_limit: None,
            expires_at: None,
            combo_scope: None,
            min_user_level: None,
        },
    )
    .await
    .unwrap();

    // subtotal 200 + bonus 20 → 220; 10% → 22; total 198
    let quote = pricing::build_quote(
        &pool,
        tourist.level,
        &BookingCreate {
            item: BookingItem::Service(main_svc.id),
            quantity: 2,
            bonus_service_id: Some(bonus_svc.id),
            coupon_code: Some("TEN-OFF".into()),
            note: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(quote.unit_price, 100.0);
    assert_eq!(quote.subtotal, 200.0);
    assert_eq!(quote.bonus_price, 20.0);
    assert_eq!(quote.discount_amount, 22.0);
    assert_eq!(quote.total_amount, 198.0);

    // Fixed discount larger than the charge floors the total at zero
    coupon::create(
        &pool,
        host.id,
        CouponCreate {
            code: "BIG-CUT".into(),
            discount: Discount::Fixed(10_000.0),
            usage_limit: None,
            expires_at: None,
            combo_scope: None,
            min_user_level: None,
        },
    )
    .await
    .unwrap();
    let quote = pricing::build_quote(
        &pool,
        tourist.level,
        &BookingCreate {
            item: BookingItem::Service(main_svc.id),
            quantity: 1,
            bonus_service_id: None,
            coupon_code: Some("BIG-CUT".into()),
            note: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(quote.discount_amount, 100.0);
    assert_eq!(quote.total_amount, 0.0);
}

#[tokio::test]
async fn combo_scoped_coupon_applies_to_its_combo() {
    let (_dir, pool) = setup().await;
    let host = seed_user(&pool, "host", Role::Host).await;
    let tourist = seed_user(&pool, "bob", Role::Tourist).await;

    let svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Museum ticket".into(),
            description: None,
            category: None,
            price: 30.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();
    let bundle = combo::create(
        &pool,
        host.id,
        ComboCreate {
            title: "Weekend bundle".into(),
            description: None,
            price: 150.0,
            image_url: None,
            items: vec![ComboItemInput {
                service_id: svc.id,
                quantity: 2,
            }],
        },
    )
    .await
    .unwrap();
    coupon::create(
        &pool,
        host.id,
        CouponCreate {
            code: "BUNDLE-15".into(),
            discount: Discount::Fixed(15.0),
            usage_limit: Some(10),
            expires_at: None,
            combo_scope: Some(bundle.combo.id),
            min_user_level: None,
        },
    )
    .await
    .unwrap();

    let quote = pricing::build_quote(
        &pool,
        tourist.level,
        &BookingCreate {
            item: BookingItem::Combo(bundle.combo.id),
            quantity: 1,
            bonus_service_id: None,
            coupon_code: Some("BUNDLE-15".into()),
            note: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(quote.total_amount, 135.0);
}

#[tokio::test]
async fn status_transitions_and_loyalty_progress() {
    let (_dir, pool) = setup().await;
    let host = seed_user(&pool, "host", Role::Host).await;
    let tourist = seed_user(&pool, "carol", Role::Tourist).await;
    assert_eq!(tourist.level, 1);

    let svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Wine tasting".into(),
            description: None,
            category: None,
            price: 45.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();

    let created = booking::create(
        &pool,
        booking::NewBooking {
            user_id: tourist.id,
            item: BookingItem::Service(svc.id),
            quantity: 1,
            unit_price: 45.0,
            bonus_service_id: None,
            bonus_price: 0.0,
            discount_amount: 0.0,
            total_amount: 45.0,
            note: None,
            coupon_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.status, BookingStatus::Pending);

    // Completed straight from Pending is not allowed
    let jumped = booking::transition_status(
        &pool,
        created.id,
        BookingStatus::Completed,
        &[BookingStatus::Confirmed],
    )
    .await
    .unwrap();
    assert!(!jumped);

    // Pending → Confirmed → Completed
    assert!(
        booking::transition_status(
            &pool,
            created.id,
            BookingStatus::Confirmed,
            &[BookingStatus::Pending]
        )
        .await
        .unwrap()
    );
    assert!(
        booking::transition_status(
            &pool,
            created.id,
            BookingStatus::Completed,
            &[BookingStatus::Confirmed]
        )
        .await
        .unwrap()
    );
    user::bump_completed_bookings(&pool, tourist.id).await.unwrap();

    let progressed = user::find_by_id(&pool, tourist.id).await.unwrap().unwrap();
    assert_eq!(progressed.completed_bookings, 1);
    assert_eq!(progressed.level, 1); // 5 的整数倍才升级

    // Completed bookings cannot be cancelled
    assert!(!booking::cancel(&pool, created.id).await.unwrap());
}

#[tokio::test]
async fn cancelling_releases_the_coupon_slot() {
    let (_dir, pool) = setup().await;
    let host = seed_user(&pool, "host", Role::Host).await;
    let tourist = seed_user(&pool, "dave", Role::Tourist).await;

    let svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Bike tour".into(),
            description: None,
            category: None,
            price: 25.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();
    let issued = coupon::create(
        &pool,
        host.id,
        CouponCreate {
            code: "RIDE-5".into(),
            discount: Discount::Fixed(5.0),
            usage_limit: Some(1),
            expires_at: None,
            combo_scope: None,
            min_user_level: None,
        },
    )
    .await
    .unwrap();

    let created = booking::create(
        &pool,
        booking::NewBooking {
            user_id: tourist.id,
            item: BookingItem::Service(svc.id),
            quantity: 1,
            unit_price: 25.0,
            bonus_service_id: None,
            bonus_price: 0.0,
            discount_amount: 5.0,
            total_amount: 20.0,
            note: None,
            coupon_id: Some(issued.id),
        },
    )
    .await
    .unwrap();

    let claimed = coupon::find_by_id(&pool, issued.id).await.unwrap().unwrap();
    assert_eq!(claimed.usage_count, 1);

    assert!(booking::cancel(&pool, created.id).await.unwrap());

    let released = coupon::find_by_id(&pool, issued.id).await.unwrap().unwrap();
    assert_eq!(released.usage_count, 0);
    assert_eq!(coupon::applied_coupon_id(&pool, created.id).await.unwrap(), None);

    let cancelled = booking::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn payment_settlement_is_idempotent() {
    let (_dir, pool) = setup().await;
    let host = seed_user(&pool, "host", Role::Host).await;
    let tourist = seed_user(&pool, "erin", Role::Tourist).await;

    let svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Cooking class".into(),
            description: None,
            category: None,
            price: 70.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();
    let created = booking::create(
        &pool,
        booking::NewBooking {
            user_id: tourist.id,
            item: BookingItem::Service(svc.id),
            quantity: 1,
            unit_price: 70.0,
            bonus_service_id: None,
            bonus_price: 0.0,
            discount_amount: 0.0,
            total_amount: 70.0,
            note: None,
            coupon_id: None,
        },
    )
    .await
    .unwrap();

    let pay = payment::create_for_booking(&pool, created.id, tourist.id, 70.0, "ref-abc-123")
        .await
        .unwrap();
    assert_eq!(pay.status, PaymentStatus::Pending);

    // Webhook 事件第一次记录成功，重复则为 false
    assert!(payment::record_webhook_event(&pool, "evt_1", "payment.succeeded")
        .await
        .unwrap());
    assert!(!payment::record_webhook_event(&pool, "evt_1", "payment.succeeded")
        .await
        .unwrap());

    // Settle PENDING → SUCCEEDED once; the second settle is a no-op
    assert!(payment::settle(&pool, pay.id, PaymentStatus::Succeeded, Some("card"))
        .await
        .unwrap());
    assert!(!payment::settle(&pool, pay.id, PaymentStatus::Failed, None)
        .await
        .unwrap());

    let settled = payment::find_by_gateway_ref(&pool, "ref-abc-123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, PaymentStatus::Succeeded);
    assert_eq!(settled.method.as_deref(), Some("card"));
}

#[tokio::test]
async fn one_review_per_booking() {
    let (_dir, pool) = setup().await;
    let host = seed_user(&pool, "host", Role::Host).await;
    let tourist = seed_user(&pool, "fred", Role::Tourist).await;

    let svc = service::create(
        &pool,
        host.id,
        ServiceCreate {
            title: "Snorkeling".into(),
            description: None,
            category: None,
            price: 55.0,
            unit: None,
            image_url: None,
            location: None,
        },
    )
    .await
    .unwrap();
    let created = booking::create(
        &pool,
        booking::NewBooking {
            user_id: tourist.id,
            item: BookingItem::Service(svc.id),
            quantity: 1,
            unit_price: 55.0,
            bonus_service_id: None,
            bonus_price: 0.0,
            discount_amount: 0.0,
            total_amount: 55.0,
            note: None,
            coupon_id: None,
        },
    )
    .await
    .unwrap();

    review::create(
        &pool,
        created.id,
        tourist.id,
        created.item,
        5,
        Some("Great trip"),
    )
    .await
    .unwrap();

    // booking_id 唯一索引挡掉第二条
    let err = review::create(&pool, created.id, tourist.id, created.item, 4, None)
        .await
        .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("review"));

    let summary = review::summary(&pool, created.item).await.unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average_rating, 5.0);
}
