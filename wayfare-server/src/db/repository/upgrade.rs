//! Certificate Upgrade Repository

use super::{RepoError, RepoResult, from_json_array, to_json_array};
use shared::models::{Role, UpgradeRequest, UpgradeStatus};
use sqlx::SqlitePool;

const UPGRADE_SELECT: &str = "SELECT id, user_id, target_role, document_urls, note, status, fee_paid, reviewed_by, review_note, created_at, reviewed_at FROM upgrade_request";

#[derive(Debug, sqlx::FromRow)]
struct UpgradeRow {
    id: i64,
    user_id: i64,
    target_role: Role,
    document_urls: String,
    note: Option<String>,
    status: UpgradeStatus,
    fee_paid: bool,
    reviewed_by: Option<i64>,
    review_note: Option<String>,
    created_at: i64,
    reviewed_at: Option<i64>,
}

impl From<UpgradeRow> for UpgradeRequest {
    fn from(row: UpgradeRow) -> Self {
        UpgradeRequest {
            id: row.id,
            user_id: row.user_id,
            target_role: row.target_role,
            document_urls: from_json_array(&row.document_urls),
            note: row.note,
            status: row.status,
            fee_paid: row.fee_paid,
            reviewed_by: row.reviewed_by,
            review_note: row.review_note,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UpgradeRequest>> {
    let sql = format!("{} WHERE id = ?", UPGRADE_SELECT);
    let row = sqlx::query_as::<_, UpgradeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(UpgradeRequest::from))
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<UpgradeRequest>> {
    let sql = format!("{} WHERE user_id = ? ORDER BY created_at DESC", UPGRADE_SELECT);
    let rows = sqlx::query_as::<_, UpgradeRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(UpgradeRequest::from).collect())
}

pub async fn find_pending_by_user(
    pool: &SqlitePool,
    user_id: i64,
) -> RepoResult<Option<UpgradeRequest>> {
    let sql = format!(
        "{} WHERE user_id = ? AND status = 'PENDING' LIMIT 1",
        UPGRADE_SELECT
    );
    let row = sqlx::query_as::<_, UpgradeRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(UpgradeRequest::from))
}

pub async fn find_all(
    pool: &SqlitePool,
    status: Option<UpgradeStatus>,
) -> RepoResult<Vec<UpgradeRequest>> {
    let mut sql = UPGRADE_SELECT.to_string();
    if status.is_some() {
        sql.push_str(" WHERE status = ?1");
    } else {
        sql.push_str(" WHERE ?1 IS NULL");
    }
    sql.push_str(" ORDER BY created_at ASC");
    let rows = sqlx::query_as::<_, UpgradeRow>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(UpgradeRequest::from).collect())
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    target_role: Role,
    document_urls: &[String],
    note: Option<&str>,
) -> RepoResult<UpgradeRequest> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO upgrade_request (id, user_id, target_role, document_urls, note, status, fee_paid, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING', 0, ?6)",
    )
    .bind(id)
    .bind(user_id)
    .bind(target_role)
    .bind(to_json_array(document_urls))
    .bind(note)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create upgrade request".into()))
}

/// Webhook 确认升级费到账
pub async fn mark_fee_paid(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE upgrade_request SET fee_paid = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// 审批落定：仅 PENDING 可审 (原子条件更新)。
///
/// 批准路径的角色变更由调用方在同一流程内完成。
pub async fn review(
    pool: &SqlitePool,
    id: i64,
    approve: bool,
    reviewer_id: i64,
    review_note: Option<&str>,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let status = if approve {
        UpgradeStatus::Approved
    } else {
        UpgradeStatus::Rejected
    };
    let rows = sqlx::query(
        "UPDATE upgrade_request SET status = ?1, reviewed_by = ?2, review_note = ?3, reviewed_at = ?4 WHERE id = ?5 AND status = 'PENDING'",
    )
    .bind(status)
    .bind(reviewer_id)
    .bind(review_note)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
