//! Statistics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::stats;
use crate::utils::AppResult;

// ============================================================================
// Response Types
// ============================================================================

/// Overview statistics
#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    pub revenue: f64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub total_users: i64,
    pub publisher_users: i64,
    pub coupon_redemptions: i64,
    pub recent_signups: i64,
}

/// Revenue trend data point
#[derive(Debug, Clone, Serialize)]
pub struct RevenueTrendPoint {
    /// "YYYY-MM-DD" (UTC)
    pub date: String,
    pub revenue: f64,
    pub bookings: i64,
}

/// Top item entry
#[derive(Debug, Clone, Serialize)]
pub struct TopItem {
    pub item_type: String,
    pub item_id: i64,
    pub title: String,
    pub bookings: i64,
    pub revenue: f64,
}

/// Full statistics response
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResponse {
    pub overview: OverviewStats,
    pub trend: Vec<RevenueTrendPoint>,
    pub top_items: Vec<TopItem>,
}

#[derive(Deserialize, Default)]
pub struct StatsQuery {
    /// 趋势窗口天数，默认 30
    pub days: Option<i64>,
}

fn day_label(day_start_millis: i64) -> String {
    DateTime::from_timestamp_millis(day_start_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| day_start_millis.to_string())
}

/// GET /api/statistics/overview?days= - 平台统计 (admin)
pub async fn overview(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatisticsResponse>> {
    let days = query.days.unwrap_or(30).clamp(1, 365);

    let overview = stats::overview(&state.pool).await?;
    let recent_signups = stats::recent_signups(&state.pool, days).await?;
    let trend = stats::revenue_trend(&state.pool, days).await?;
    let top = stats::top_items(&state.pool, 10).await?;

    Ok(Json(StatisticsResponse {
        overview: OverviewStats {
            revenue: overview.revenue,
            pending_bookings: overview.pending_bookings,
            confirmed_bookings: overview.confirmed_bookings,
            completed_bookings: overview.completed_bookings,
            cancelled_bookings: overview.cancelled_bookings,
            total_users: overview.total_users,
            publisher_users: overview.publisher_users,
            coupon_redemptions: overview.coupon_redemptions,
            recent_signups,
        },
        trend: trend
            .into_iter()
            .map(|b| RevenueTrendPoint {
                date: day_label(b.day_start),
                revenue: b.revenue,
                bookings: b.bookings,
            })
            .collect(),
        top_items: top
            .into_iter()
            .map(|t| TopItem {
                item_type: t.item_type,
                item_id: t.item_id,
                title: t.title.unwrap_or_else(|| "(removed)".to_string()),
                bookings: t.bookings,
                revenue: t.revenue,
            })
            .collect(),
    }))
}

/// Host 侧精简统计
#[derive(Debug, Clone, Serialize)]
pub struct HostStatsResponse {
    pub revenue: f64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub coupon_redemptions: i64,
}

/// GET /api/statistics/host - 自己条目上的统计 (host)
pub async fn host_overview(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<HostStatsResponse>> {
    let row = stats::host_overview(&state.pool, current_user.id).await?;
    Ok(Json(HostStatsResponse {
        revenue: row.revenue,
        pending_bookings: row.pending_bookings,
        confirmed_bookings: row.confirmed_bookings,
        completed_bookings: row.completed_bookings,
        cancelled_bookings: row.cancelled_bookings,
        coupon_redemptions: row.coupon_redemptions,
    }))
}
