//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User, UserPublic};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, username, email, password_hash, display_name, avatar_url, role, level, completed_bookings, is_active, created_at, updated_at FROM user";

const PUBLIC_SELECT: &str = "SELECT id, username, display_name, avatar_url, role FROM user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE id = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE username = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE email = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_public(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserPublic>> {
    let sql = format!("{} WHERE id = ?", PUBLIC_SELECT);
    let row = sqlx::query_as::<_, UserPublic>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{} ORDER BY created_at DESC", USER_SELECT);
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// 注册新用户 (角色固定 Tourist，等级 1)
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, username, email, password_hash, display_name, role, level, completed_bookings, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'TOURIST', 1, 0, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET display_name = COALESCE(?1, display_name), avatar_url = COALESCE(?2, avatar_url), updated_at = ?3 WHERE id = ?4",
    )
    .bind(display_name)
    .bind(avatar_url)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(active)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// 升级审批通过后修改角色
pub async fn set_role(pool: &SqlitePool, id: i64, role: Role) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET role = ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1")
        .bind(role)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Active user {id} not found")));
    }
    Ok(())
}

/// 完成预订后推进忠诚度：每 5 个完成的预订提升一级
pub async fn bump_completed_bookings(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE user SET completed_bookings = completed_bookings + 1, level = 1 + (completed_bookings + 1) / 5, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
