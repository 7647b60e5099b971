//! Coupon Repository
//!
//! 用量计数的领取/释放是核心不变量：
//! 领取是单条条件 UPDATE (`usage_count < usage_limit`)，通过
//! rows_affected 判断成败，和加入 booking_coupon 行在同一事务内 —
//! 并发领取最后一个名额时只有一个会成功。

use super::{RepoError, RepoResult};
use shared::models::{Coupon, CouponCreate, CouponUpdate, Discount};
use sqlx::SqlitePool;

const COUPON_SELECT: &str = "SELECT id, code, host_id, discount_type, discount_value, usage_limit, usage_count, is_active, expires_at, combo_scope, min_user_level, created_at, updated_at FROM coupon";

/// SQLite coupon 行：(discount_type, discount_value) 列对在
/// [`Coupon`] 里收敛为 [`Discount`] 和类型。
#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: i64,
    code: String,
    host_id: i64,
    discount_type: String,
    discount_value: f64,
    usage_limit: Option<i64>,
    usage_count: i64,
    is_active: bool,
    expires_at: Option<i64>,
    combo_scope: Option<i64>,
    min_user_level: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = RepoError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let discount = Discount::decode(&row.discount_type, row.discount_value)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(Coupon {
            id: row.id,
            code: row.code,
            host_id: row.host_id,
            discount,
            usage_limit: row.usage_limit,
            usage_count: row.usage_count,
            is_active: row.is_active,
            expires_at: row.expires_at,
            combo_scope: row.combo_scope,
            min_user_level: row.min_user_level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 按兑换码精确查找 (区分大小写，唯一索引语义)
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Coupon>> {
    let sql = format!("{} WHERE code = ?", COUPON_SELECT);
    let row = sqlx::query_as::<_, CouponRow>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    row.map(Coupon::try_from).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Coupon>> {
    let sql = format!("{} WHERE id = ?", COUPON_SELECT);
    let row = sqlx::query_as::<_, CouponRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Coupon::try_from).transpose()
}

pub async fn find_by_host(pool: &SqlitePool, host_id: i64) -> RepoResult<Vec<Coupon>> {
    let sql = format!("{} WHERE host_id = ? ORDER BY created_at DESC", COUPON_SELECT);
    let rows = sqlx::query_as::<_, CouponRow>(&sql)
        .bind(host_id)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Coupon::try_from).collect()
}

pub async fn create(pool: &SqlitePool, host_id: i64, data: CouponCreate) -> RepoResult<Coupon> {
    // Check duplicate code up front for a friendly error; the unique index
    // still backs this under races.
    if find_by_code(pool, &data.code).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Coupon '{}' already exists",
            data.code
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let (discount_type, discount_value) = data.discount.encode();
    sqlx::query(
        "INSERT INTO coupon (id, code, host_id, discount_type, discount_value, usage_limit, usage_count, is_active, expires_at, combo_scope, min_user_level, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 1, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(&data.code)
    .bind(host_id)
    .bind(discount_type)
    .bind(discount_value)
    .bind(data.usage_limit)
    .bind(data.expires_at)
    .bind(data.combo_scope)
    .bind(data.min_user_level.unwrap_or(1))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create coupon".into()))
}

/// 更新标志/限额/过期时间 (code 与 discount 发行后不可变)
pub async fn update(pool: &SqlitePool, id: i64, data: CouponUpdate) -> RepoResult<Coupon> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE coupon SET usage_limit = COALESCE(?1, usage_limit), expires_at = COALESCE(?2, expires_at), is_active = COALESCE(?3, is_active), min_user_level = COALESCE(?4, min_user_level), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.usage_limit)
    .bind(data.expires_at)
    .bind(data.is_active)
    .bind(data.min_user_level)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Coupon {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coupon {id} not found")))
}

/// 预订上已应用的优惠券 (一张预订最多一张券)
pub async fn applied_coupon_id(pool: &SqlitePool, booking_id: i64) -> RepoResult<Option<i64>> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT coupon_id FROM booking_coupon WHERE booking_id = ? LIMIT 1")
            .bind(booking_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Atomically claim one usage slot. Returns false when the coupon is
/// inactive or exhausted — the caller must treat that as a rejection.
pub(crate) async fn claim_usage(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    coupon_id: i64,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE coupon SET usage_count = usage_count + 1, updated_at = ?1 WHERE id = ?2 AND is_active = 1 AND (usage_limit IS NULL OR usage_count < usage_limit)",
    )
    .bind(now)
    .bind(coupon_id)
    .execute(&mut **tx)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Release one usage slot, floored at zero.
pub(crate) async fn release_usage(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    coupon_id: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE coupon SET usage_count = MAX(usage_count - 1, 0), updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(coupon_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// 应用优惠券到既有预订：领取名额 + 写入 join 行 + 刷新预订金额，单事务。
///
/// 折扣金额由定价层算好传入；这里只负责原子性。
pub async fn apply_to_booking(
    pool: &SqlitePool,
    booking_id: i64,
    coupon_id: i64,
    discount_amount: f64,
    new_total: f64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // One coupon per booking
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT coupon_id FROM booking_coupon WHERE booking_id = ? LIMIT 1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(RepoError::Validation(
            "Booking already has a coupon applied".into(),
        ));
    }

    if !claim_usage(&mut tx, coupon_id).await? {
        return Err(RepoError::Validation("Coupon usage limit reached".into()));
    }

    sqlx::query(
        "INSERT INTO booking_coupon (booking_id, coupon_id, applied_at) VALUES (?1, ?2, ?3)",
    )
    .bind(booking_id)
    .bind(coupon_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE booking SET discount_amount = ?1, total_amount = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(discount_amount)
    .bind(new_total)
    .bind(now)
    .bind(booking_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// 从预订移除优惠券：删 join 行 + 释放名额 + 恢复预订金额，单事务。
///
/// Returns the released coupon id, or None when nothing was applied.
pub async fn remove_from_booking(
    pool: &SqlitePool,
    booking_id: i64,
    restored_total: f64,
) -> RepoResult<Option<i64>> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT coupon_id FROM booking_coupon WHERE booking_id = ? LIMIT 1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((coupon_id,)) = existing else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM booking_coupon WHERE booking_id = ?1 AND coupon_id = ?2")
        .bind(booking_id)
        .bind(coupon_id)
        .execute(&mut *tx)
        .await?;

    release_usage(&mut tx, coupon_id).await?;

    sqlx::query(
        "UPDATE booking SET discount_amount = 0, total_amount = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(restored_total)
    .bind(now)
    .bind(booking_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(coupon_id))
}
