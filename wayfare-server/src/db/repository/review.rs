//! Review Repository

use super::{RepoError, RepoResult};
use shared::models::{BookingItem, Review, ReviewDetail, ReviewSummary, Role, UserPublic};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    booking_id: i64,
    user_id: i64,
    item_type: String,
    item_id: i64,
    rating: i64,
    comment: Option<String>,
    created_at: i64,
    // author join
    username: String,
    display_name: String,
    avatar_url: Option<String>,
    role: Role,
}

impl TryFrom<ReviewRow> for ReviewDetail {
    type Error = RepoError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let item = BookingItem::decode(&row.item_type, row.item_id)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(ReviewDetail {
            review: Review {
                id: row.id,
                booking_id: row.booking_id,
                user_id: row.user_id,
                item,
                rating: row.rating,
                comment: row.comment,
                created_at: row.created_at,
            },
            author: UserPublic {
                id: row.user_id,
                username: row.username,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
                role: row.role,
            },
        })
    }
}

const REVIEW_SELECT: &str = "SELECT r.id, r.booking_id, r.user_id, r.item_type, r.item_id, r.rating, r.comment, r.created_at, u.username, u.display_name, u.avatar_url, u.role FROM review r JOIN user u ON r.user_id = u.id";

pub async fn find_by_item(pool: &SqlitePool, item: BookingItem) -> RepoResult<Vec<ReviewDetail>> {
    let (item_type, item_id) = item.encode();
    let sql = format!(
        "{} WHERE r.item_type = ?1 AND r.item_id = ?2 ORDER BY r.created_at DESC",
        REVIEW_SELECT
    );
    let rows = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(item_type)
        .bind(item_id)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(ReviewDetail::try_from).collect()
}

pub async fn find_by_booking(pool: &SqlitePool, booking_id: i64) -> RepoResult<Option<ReviewDetail>> {
    let sql = format!("{} WHERE r.booking_id = ?", REVIEW_SELECT);
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;
    row.map(ReviewDetail::try_from).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ReviewDetail>> {
    let sql = format!("{} WHERE r.id = ?", REVIEW_SELECT);
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(ReviewDetail::try_from).transpose()
}

/// 评分聚合 (AVG 四舍五入 2 位)
pub async fn summary(pool: &SqlitePool, item: BookingItem) -> RepoResult<ReviewSummary> {
    let (item_type, item_id) = item.encode();
    let row: (i64, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), ROUND(AVG(rating), 2) FROM review WHERE item_type = ?1 AND item_id = ?2",
    )
    .bind(item_type)
    .bind(item_id)
    .fetch_one(pool)
    .await?;
    Ok(ReviewSummary {
        count: row.0,
        average_rating: row.1.unwrap_or(0.0),
    })
}

/// booking_id UNIQUE 索引保证一个预订只能评一次
pub async fn create(
    pool: &SqlitePool,
    booking_id: i64,
    user_id: i64,
    item: BookingItem,
    rating: i64,
    comment: Option<&str>,
) -> RepoResult<ReviewDetail> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let (item_type, item_id) = item.encode();
    sqlx::query(
        "INSERT INTO review (id, booking_id, user_id, item_type, item_id, rating, comment, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(booking_id)
    .bind(user_id)
    .bind(item_type)
    .bind(item_id)
    .bind(rating)
    .bind(comment)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate("Booking has already been reviewed".into())
        }
        other => other,
    })?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create review".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM review WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
