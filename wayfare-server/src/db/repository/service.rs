//! Service Repository

use super::{RepoError, RepoResult};
use shared::models::{Service, ServiceCreate, ServiceFilter, ServiceUpdate};
use sqlx::SqlitePool;

const SERVICE_SELECT: &str = "SELECT id, host_id, title, description, category, price, unit, image_url, location, is_active, created_at, updated_at FROM service";

/// 公开目录：仅活跃服务，可按分类/host/标题过滤
pub async fn find_active(pool: &SqlitePool, filter: &ServiceFilter) -> RepoResult<Vec<Service>> {
    let mut sql = format!("{} WHERE is_active = 1", SERVICE_SELECT);
    if filter.category.is_some() {
        sql.push_str(" AND category = ?1");
    } else {
        sql.push_str(" AND ?1 IS NULL");
    }
    if filter.host_id.is_some() {
        sql.push_str(" AND host_id = ?2");
    } else {
        sql.push_str(" AND ?2 IS NULL");
    }
    if filter.q.is_some() {
        sql.push_str(" AND title LIKE ?3");
    } else {
        sql.push_str(" AND ?3 IS NULL");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let pattern = filter.q.as_ref().map(|q| format!("%{q}%"));
    let rows = sqlx::query_as::<_, Service>(&sql)
        .bind(&filter.category)
        .bind(filter.host_id)
        .bind(pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Host 后台：包含已下架的自有服务
pub async fn find_by_host(pool: &SqlitePool, host_id: i64) -> RepoResult<Vec<Service>> {
    let sql = format!(
        "{} WHERE host_id = ? ORDER BY created_at DESC",
        SERVICE_SELECT
    );
    let rows = sqlx::query_as::<_, Service>(&sql)
        .bind(host_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Service>> {
    let sql = format!("{} WHERE id = ?", SERVICE_SELECT);
    let row = sqlx::query_as::<_, Service>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, host_id: i64, data: ServiceCreate) -> RepoResult<Service> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO service (id, host_id, title, description, category, price, unit, image_url, location, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)",
    )
    .bind(id)
    .bind(host_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.unit.as_deref().unwrap_or("person"))
    .bind(&data.image_url)
    .bind(&data.location)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create service".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ServiceUpdate) -> RepoResult<Service> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE service SET title = COALESCE(?1, title), description = COALESCE(?2, description), category = COALESCE(?3, category), price = COALESCE(?4, price), unit = COALESCE(?5, unit), image_url = COALESCE(?6, image_url), location = COALESCE(?7, location), is_active = COALESCE(?8, is_active), updated_at = ?9 WHERE id = ?10",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.category)
    .bind(data.price)
    .bind(&data.unit)
    .bind(&data.image_url)
    .bind(&data.location)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Service {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Service {id} not found")))
}

/// 软删除 (下架)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows =
        sqlx::query("UPDATE service SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
    Ok(rows.rows_affected() > 0)
}
