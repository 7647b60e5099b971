//! Booking Repository

use super::{RepoError, RepoResult, coupon};
use shared::models::{Booking, BookingItem, BookingStatus};
use sqlx::SqlitePool;

const BOOKING_SELECT: &str = "SELECT id, user_id, item_type, item_id, quantity, unit_price, bonus_service_id, bonus_price, discount_amount, total_amount, status, note, created_at, updated_at FROM booking";

/// SQLite booking 行：(item_type, item_id) 列对在 [`Booking`] 里
/// 收敛为 [`BookingItem`] 和类型。
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: i64,
    user_id: i64,
    item_type: String,
    item_id: i64,
    quantity: i64,
    unit_price: f64,
    bonus_service_id: Option<i64>,
    bonus_price: f64,
    discount_amount: f64,
    total_amount: f64,
    status: BookingStatus,
    note: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let item = BookingItem::decode(&row.item_type, row.item_id)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            item,
            quantity: row.quantity,
            unit_price: row.unit_price,
            bonus_service_id: row.bonus_service_id,
            bonus_price: row.bonus_price,
            discount_amount: row.discount_amount,
            total_amount: row.total_amount,
            status: row.status,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Booking>> {
    let sql = format!("{} WHERE id = ?", BOOKING_SELECT);
    let row = sqlx::query_as::<_, BookingRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Booking::try_from).transpose()
}

pub async fn find_by_user(
    pool: &SqlitePool,
    user_id: i64,
    status: Option<BookingStatus>,
) -> RepoResult<Vec<Booking>> {
    let mut sql = format!("{} WHERE user_id = ?1", BOOKING_SELECT);
    if status.is_some() {
        sql.push_str(" AND status = ?2");
    } else {
        sql.push_str(" AND ?2 IS NULL");
    }
    sql.push_str(" ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, BookingRow>(&sql)
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Booking::try_from).collect()
}

/// Host 视角：预订的 item 属于该 host 的服务或套餐
pub async fn find_by_host(pool: &SqlitePool, host_id: i64) -> RepoResult<Vec<Booking>> {
    let sql = format!(
        "{} WHERE (item_type = 'SERVICE' AND item_id IN (SELECT id FROM service WHERE host_id = ?1)) OR (item_type = 'COMBO' AND item_id IN (SELECT id FROM service_combo WHERE host_id = ?1)) ORDER BY created_at DESC",
        BOOKING_SELECT
    );
    let rows = sqlx::query_as::<_, BookingRow>(&sql)
        .bind(host_id)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Booking::try_from).collect()
}

pub async fn find_all(
    pool: &SqlitePool,
    status: Option<BookingStatus>,
) -> RepoResult<Vec<Booking>> {
    let mut sql = BOOKING_SELECT.to_string();
    if status.is_some() {
        sql.push_str(" WHERE status = ?1");
    } else {
        sql.push_str(" WHERE ?1 IS NULL");
    }
    sql.push_str(" ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, BookingRow>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Booking::try_from).collect()
}

/// 新预订的落库参数 (金额已由定价层算好)
pub struct NewBooking {
    pub user_id: i64,
    pub item: BookingItem,
    pub quantity: i64,
    pub unit_price: f64,
    pub bonus_service_id: Option<i64>,
    pub bonus_price: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub note: Option<String>,
    /// 随预订一起应用的优惠券
    pub coupon_id: Option<i64>,
}

/// 创建预订；若带优惠券，名额领取与 join 行写入在同一事务内。
pub async fn create(pool: &SqlitePool, data: NewBooking) -> RepoResult<Booking> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let (item_type, item_id) = data.item.encode();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO booking (id, user_id, item_type, item_id, quantity, unit_price, bonus_service_id, bonus_price, discount_amount, total_amount, status, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'PENDING', ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(item_type)
    .bind(item_id)
    .bind(data.quantity)
    .bind(data.unit_price)
    .bind(data.bonus_service_id)
    .bind(data.bonus_price)
    .bind(data.discount_amount)
    .bind(data.total_amount)
    .bind(&data.note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if let Some(coupon_id) = data.coupon_id {
        if !coupon::claim_usage(&mut tx, coupon_id).await? {
            // 回滚整个预订：限额在校验和落库之间被并发耗尽
            return Err(RepoError::Validation("Coupon usage limit reached".into()));
        }
        sqlx::query(
            "INSERT INTO booking_coupon (booking_id, coupon_id, applied_at) VALUES (?1, ?2, ?3)",
        )
        .bind(id)
        .bind(coupon_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create booking".into()))
}

/// 条件状态迁移：仅当当前状态在 `allowed_from` 内才更新 (原子)。
///
/// Returns false when the booking exists but is not in an allowed state.
pub async fn transition_status(
    pool: &SqlitePool,
    id: i64,
    to: BookingStatus,
    allowed_from: &[BookingStatus],
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let placeholders: Vec<String> = (0..allowed_from.len())
        .map(|i| format!("?{}", i + 4))
        .collect();
    let sql = format!(
        "UPDATE booking SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status IN ({})",
        placeholders.join(", ")
    );
    let mut query = sqlx::query(&sql).bind(to).bind(now).bind(id);
    for from in allowed_from {
        query = query.bind(*from);
    }
    let rows = query.execute(pool).await?;
    Ok(rows.rows_affected() > 0)
}

/// 取消预订并释放已应用的优惠券名额，单事务。
pub async fn cancel(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE booking SET status = 'CANCELLED', updated_at = ?1 WHERE id = ?2 AND status IN ('PENDING', 'CONFIRMED')",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Ok(false);
    }

    let applied: Option<(i64,)> =
        sqlx::query_as("SELECT coupon_id FROM booking_coupon WHERE booking_id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    if let Some((coupon_id,)) = applied {
        sqlx::query("DELETE FROM booking_coupon WHERE booking_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        coupon::release_usage(&mut tx, coupon_id).await?;
    }

    tx.commit().await?;
    Ok(true)
}
