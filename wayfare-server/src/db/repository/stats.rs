//! Statistics Repository
//!
//! 按需 SQL 聚合，无预计算。日桶使用 UTC (created_at / 86400000)。

use super::RepoResult;
use sqlx::SqlitePool;

const DAY_MS: i64 = 86_400_000;

/// 平台总览聚合
#[derive(Debug, Clone, Default)]
pub struct OverviewRow {
    pub revenue: f64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub total_users: i64,
    pub publisher_users: i64,
    pub coupon_redemptions: i64,
}

pub async fn overview(pool: &SqlitePool) -> RepoResult<OverviewRow> {
    let (revenue,): (Option<f64>,) =
        sqlx::query_as("SELECT SUM(total_amount) FROM booking WHERE status = 'COMPLETED'")
            .fetch_one(pool)
            .await?;

    let counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM booking GROUP BY status")
            .fetch_all(pool)
            .await?;

    let (total_users, publisher_users) = sqlx::query_as::<_, (i64, Option<i64>)>(
        "SELECT COUNT(*), SUM(CASE WHEN role IN ('HOST', 'AGENCY') THEN 1 ELSE 0 END) FROM user WHERE is_active = 1",
    )
    .fetch_one(pool)
    .await
    .map(|(total, publishers)| (total, publishers.unwrap_or(0)))?;

    let (coupon_redemptions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM booking_coupon")
        .fetch_one(pool)
        .await?;

    let mut row = OverviewRow {
        revenue: revenue.unwrap_or(0.0),
        total_users,
        publisher_users,
        coupon_redemptions,
        ..Default::default()
    };
    for (status, count) in counts {
        match status.as_str() {
            "PENDING" => row.pending_bookings = count,
            "CONFIRMED" => row.confirmed_bookings = count,
            "COMPLETED" => row.completed_bookings = count,
            "CANCELLED" => row.cancelled_bookings = count,
            _ => {}
        }
    }
    Ok(row)
}

/// 每日营收桶 (day_start = UTC 当天零点 millis)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RevenueBucket {
    pub day_start: i64,
    pub revenue: f64,
    pub bookings: i64,
}

/// 最近 `days` 天的完成预订营收，按日分桶 (无预订的日子缺席)
pub async fn revenue_trend(pool: &SqlitePool, days: i64) -> RepoResult<Vec<RevenueBucket>> {
    let since = shared::util::now_millis() - days * DAY_MS;
    let rows = sqlx::query_as::<_, RevenueBucket>(
        "SELECT (created_at / 86400000) * 86400000 AS day_start, SUM(total_amount) AS revenue, COUNT(*) AS bookings FROM booking WHERE status = 'COMPLETED' AND created_at >= ? GROUP BY created_at / 86400000 ORDER BY day_start ASC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// 热门条目 (按完成预订数)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopItemRow {
    pub item_type: String,
    pub item_id: i64,
    pub title: Option<String>,
    pub bookings: i64,
    pub revenue: f64,
}

pub async fn top_items(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<TopItemRow>> {
    let rows = sqlx::query_as::<_, TopItemRow>(
        "SELECT b.item_type, b.item_id, COALESCE(s.title, c.title) AS title, COUNT(*) AS bookings, SUM(b.total_amount) AS revenue FROM booking b LEFT JOIN service s ON b.item_type = 'SERVICE' AND s.id = b.item_id LEFT JOIN service_combo c ON b.item_type = 'COMBO' AND c.id = b.item_id WHERE b.status = 'COMPLETED' GROUP BY b.item_type, b.item_id ORDER BY bookings DESC, revenue DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Host 视角总览：只统计自己条目上的预订
pub async fn host_overview(pool: &SqlitePool, host_id: i64) -> RepoResult<OverviewRow> {
    let (revenue,): (Option<f64>,) = sqlx::query_as(
        "SELECT SUM(total_amount) FROM booking WHERE status = 'COMPLETED' AND ((item_type = 'SERVICE' AND item_id IN (SELECT id FROM service WHERE host_id = ?1)) OR (item_type = 'COMBO' AND item_id IN (SELECT id FROM service_combo WHERE host_id = ?1)))",
    )
    .bind(host_id)
    .fetch_one(pool)
    .await?;

    let counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM booking WHERE (item_type = 'SERVICE' AND item_id IN (SELECT id FROM service WHERE host_id = ?1)) OR (item_type = 'COMBO' AND item_id IN (SELECT id FROM service_combo WHERE host_id = ?1)) GROUP BY status",
    )
    .bind(host_id)
    .fetch_all(pool)
    .await?;

    let (coupon_redemptions,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM booking_coupon bc WHERE bc.coupon_id IN (SELECT id FROM coupon WHERE host_id = ?1)",
    )
    .bind(host_id)
    .fetch_one(pool)
    .await?;

    let mut row = OverviewRow {
        revenue: revenue.unwrap_or(0.0),
        coupon_redemptions,
        ..Default::default()
    };
    for (status, count) in counts {
        match status.as_str() {
            "PENDING" => row.pending_bookings = count,
            "CONFIRMED" => row.confirmed_bookings = count,
            "COMPLETED" => row.completed_bookings = count,
            "CANCELLED" => row.cancelled_bookings = count,
            _ => {}
        }
    }
    Ok(row)
}

/// 最近注册用户数 (最近 `days` 天)
pub async fn recent_signups(pool: &SqlitePool, days: i64) -> RepoResult<i64> {
    let since = shared::util::now_millis() - days * DAY_MS;
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user WHERE created_at >= ?")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
