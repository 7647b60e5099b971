//! Post Repository (social feed)

use super::{RepoError, RepoResult, from_json_array, to_json_array};
use shared::models::{Post, PostComment, PostCommentDetail, PostDetail, Role, UserPublic};
use sqlx::SqlitePool;

/// Feed 行：帖子 + 作者 + 计数 + 调用者是否点过赞
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    content: String,
    image_urls: String,
    created_at: i64,
    updated_at: i64,
    username: String,
    display_name: String,
    avatar_url: Option<String>,
    role: Role,
    like_count: i64,
    comment_count: i64,
    liked_by_me: i64,
}

impl From<PostRow> for PostDetail {
    fn from(row: PostRow) -> Self {
        PostDetail {
            post: Post {
                id: row.id,
                author_id: row.author_id,
                content: row.content,
                image_urls: from_json_array(&row.image_urls),
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            author: UserPublic {
                id: row.author_id,
                username: row.username,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
                role: row.role,
            },
            like_count: row.like_count,
            comment_count: row.comment_count,
            liked_by_me: row.liked_by_me > 0,
        }
    }
}

const POST_SELECT: &str = "SELECT p.id, p.author_id, p.content, p.image_urls, p.created_at, p.updated_at, u.username, u.display_name, u.avatar_url, u.role, (SELECT COUNT(*) FROM post_like pl WHERE pl.post_id = p.id) AS like_count, (SELECT COUNT(*) FROM post_comment pc WHERE pc.post_id = p.id) AS comment_count, (SELECT COUNT(*) FROM post_like pl2 WHERE pl2.post_id = p.id AND pl2.author_id = ?1) AS liked_by_me FROM post p JOIN user u ON p.author_id = u.id";

/// Feed：keyset 分页，created_at 降序
pub async fn feed(
    pool: &SqlitePool,
    viewer_id: i64,
    before: Option<i64>,
    limit: i64,
) -> RepoResult<Vec<PostDetail>> {
    let sql = format!(
        "{} WHERE p.created_at < ?2 ORDER BY p.created_at DESC LIMIT ?3",
        POST_SELECT
    );
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(viewer_id)
        .bind(before.unwrap_or(i64::MAX))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(PostDetail::from).collect())
}

pub async fn find_by_id(
    pool: &SqlitePool,
    viewer_id: i64,
    id: i64,
) -> RepoResult<Option<PostDetail>> {
    let sql = format!("{} WHERE p.id = ?2", POST_SELECT);
    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(viewer_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(PostDetail::from))
}

pub async fn create(
    pool: &SqlitePool,
    author_id: i64,
    content: &str,
    image_urls: &[String],
) -> RepoResult<PostDetail> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO post (id, author_id, content, image_urls, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(author_id)
    .bind(content)
    .bind(to_json_array(image_urls))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, author_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create post".into()))
}

/// 删除帖子 (评论、点赞随 ON DELETE CASCADE)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM post WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// 点赞，幂等：重复点赞无副作用。Returns true when newly liked.
pub async fn like(pool: &SqlitePool, post_id: i64, author_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO post_like (post_id, author_id, created_at) VALUES (?1, ?2, ?3) ON CONFLICT DO NOTHING",
    )
    .bind(post_id)
    .bind(author_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn unlike(pool: &SqlitePool, post_id: i64, author_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM post_like WHERE post_id = ?1 AND author_id = ?2")
        .bind(post_id)
        .bind(author_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Comments ────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    content: String,
    created_at: i64,
    username: String,
    display_name: String,
    avatar_url: Option<String>,
    role: Role,
}

impl From<CommentRow> for PostCommentDetail {
    fn from(row: CommentRow) -> Self {
        PostCommentDetail {
            comment: PostComment {
                id: row.id,
                post_id: row.post_id,
                author_id: row.author_id,
                content: row.content,
                created_at: row.created_at,
            },
            author: UserPublic {
                id: row.author_id,
                username: row.username,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
                role: row.role,
            },
        }
    }
}

pub async fn comments(pool: &SqlitePool, post_id: i64) -> RepoResult<Vec<PostCommentDetail>> {
    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, u.username, u.display_name, u.avatar_url, u.role FROM post_comment c JOIN user u ON c.author_id = u.id WHERE c.post_id = ? ORDER BY c.created_at ASC",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(PostCommentDetail::from).collect())
}

pub async fn add_comment(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    content: &str,
) -> RepoResult<PostComment> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO post_comment (id, post_id, author_id, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(post_id)
    .bind(author_id)
    .bind(content)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(PostComment {
        id,
        post_id,
        author_id,
        content: content.to_string(),
        created_at: now,
    })
}
