//! Service Combo Repository

use super::{RepoError, RepoResult};
use shared::models::{
    ComboCreate, ComboDetail, ComboItemDetail, ComboItemInput, ComboUpdate, ServiceCombo,
};
use sqlx::SqlitePool;

const COMBO_SELECT: &str = "SELECT id, host_id, title, description, price, image_url, is_active, created_at, updated_at FROM service_combo";

pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<ServiceCombo>> {
    let sql = format!("{} WHERE is_active = 1 ORDER BY created_at DESC", COMBO_SELECT);
    let rows = sqlx::query_as::<_, ServiceCombo>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_host(pool: &SqlitePool, host_id: i64) -> RepoResult<Vec<ServiceCombo>> {
    let sql = format!("{} WHERE host_id = ? ORDER BY created_at DESC", COMBO_SELECT);
    let rows = sqlx::query_as::<_, ServiceCombo>(&sql)
        .bind(host_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ServiceCombo>> {
    let sql = format!("{} WHERE id = ?", COMBO_SELECT);
    let row = sqlx::query_as::<_, ServiceCombo>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 套餐详情：套餐 + 解析后的子项
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<ComboDetail>> {
    let Some(combo) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let items = sqlx::query_as::<_, ComboItemDetail>(
        "SELECT ci.service_id, s.title AS service_title, s.price AS service_price, ci.quantity FROM combo_item ci JOIN service s ON ci.service_id = s.id WHERE ci.combo_id = ?",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(Some(ComboDetail { combo, items }))
}

/// 创建套餐及其子项 (单事务)
///
/// 子项服务必须存在且属于同一 host — 调用方已校验。
pub async fn create(pool: &SqlitePool, host_id: i64, data: ComboCreate) -> RepoResult<ComboDetail> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO service_combo (id, host_id, title, description, price, image_url, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(host_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_items(&mut tx, id, &data.items).await?;
    tx.commit().await?;

    find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create combo".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ComboUpdate) -> RepoResult<ComboDetail> {
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE service_combo SET title = COALESCE(?1, title), description = COALESCE(?2, description), price = COALESCE(?3, price), image_url = COALESCE(?4, image_url), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Combo {id} not found")));
    }

    // items, when present, replace the whole set
    if let Some(items) = &data.items {
        sqlx::query("DELETE FROM combo_item WHERE combo_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, items).await?;
    }
    tx.commit().await?;

    find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Combo {id} not found")))
}

/// 软删除 (下架)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE service_combo SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    combo_id: i64,
    items: &[ComboItemInput],
) -> RepoResult<()> {
    for item in items {
        if item.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "combo item quantity must be positive, got {}",
                item.quantity
            )));
        }
        sqlx::query(
            "INSERT INTO combo_item (combo_id, service_id, quantity) VALUES (?1, ?2, ?3)",
        )
        .bind(combo_id)
        .bind(item.service_id)
        .bind(item.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
