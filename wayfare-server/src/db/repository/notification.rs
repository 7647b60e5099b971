//! Notification Repository

use super::RepoResult;
use shared::models::Notification;
use sqlx::SqlitePool;

const NOTIFICATION_SELECT: &str =
    "SELECT id, user_id, kind, title, body, ref_id, is_read, created_at FROM notification";

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    kind: &str,
    title: &str,
    body: &str,
    ref_id: Option<i64>,
) -> RepoResult<Notification> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO notification (id, user_id, kind, title, body, ref_id, is_read, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
    )
    .bind(id)
    .bind(user_id)
    .bind(kind)
    .bind(title)
    .bind(body)
    .bind(ref_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(Notification {
        id,
        user_id,
        kind: kind.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        ref_id,
        is_read: false,
        created_at: now,
    })
}

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: i64,
    before: Option<i64>,
    limit: i64,
) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "{} WHERE user_id = ?1 AND created_at < ?2 ORDER BY created_at DESC LIMIT ?3",
        NOTIFICATION_SELECT
    );
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(user_id)
        .bind(before.unwrap_or(i64::MAX))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn unread_count(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM notification WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// 标记单条已读 (只能标记自己的)
pub async fn mark_read(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE notification SET is_read = 1 WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let rows = sqlx::query("UPDATE notification SET is_read = 1 WHERE user_id = ? AND is_read = 0")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() as i64)
}
