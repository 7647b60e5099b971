//! Chat Repository

use super::{RepoError, RepoResult};
use shared::models::{ChatMessage, Conversation, ConversationDetail, Role, UserPublic};
use sqlx::SqlitePool;

const CONV_SELECT: &str =
    "SELECT id, user_a, user_b, created_at, last_message_at FROM conversation";

const MSG_SELECT: &str =
    "SELECT id, conversation_id, sender_id, content, sent_at, read_at FROM chat_message";

/// 参与者归一化：小 ID 在前
fn normalize(u1: i64, u2: i64) -> (i64, i64) {
    if u1 < u2 { (u1, u2) } else { (u2, u1) }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Conversation>> {
    let sql = format!("{} WHERE id = ?", CONV_SELECT);
    let row = sqlx::query_as::<_, Conversation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 打开或获取两人会话 ((user_a, user_b) UNIQUE 保证幂等)
pub async fn open(pool: &SqlitePool, me: i64, peer: i64) -> RepoResult<Conversation> {
    let (a, b) = normalize(me, peer);
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO conversation (id, user_a, user_b, created_at, last_message_at) VALUES (?1, ?2, ?3, ?4, ?4) ON CONFLICT (user_a, user_b) DO NOTHING",
    )
    .bind(id)
    .bind(a)
    .bind(b)
    .bind(now)
    .execute(pool)
    .await?;

    let sql = format!("{} WHERE user_a = ?1 AND user_b = ?2", CONV_SELECT);
    sqlx::query_as::<_, Conversation>(&sql)
        .bind(a)
        .bind(b)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to open conversation".into()))
}

/// 我的会话列表：对端资料 + 最后一条消息 + 未读数，按最近活动排序
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<ConversationDetail>> {
    let sql = format!(
        "{} WHERE user_a = ?1 OR user_b = ?1 ORDER BY last_message_at DESC",
        CONV_SELECT
    );
    let conversations = sqlx::query_as::<_, Conversation>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    let mut details = Vec::with_capacity(conversations.len());
    for conv in conversations {
        let peer_id = if conv.user_a == user_id {
            conv.user_b
        } else {
            conv.user_a
        };

        let peer = sqlx::query_as::<_, UserPublic>(
            "SELECT id, username, display_name, avatar_url, role FROM user WHERE id = ?",
        )
        .bind(peer_id)
        .fetch_optional(pool)
        .await?
        .unwrap_or(UserPublic {
            id: peer_id,
            username: "deleted".into(),
            display_name: "Deleted user".into(),
            avatar_url: None,
            role: Role::Tourist,
        });

        let last_sql = format!(
            "{} WHERE conversation_id = ? ORDER BY sent_at DESC LIMIT 1",
            MSG_SELECT
        );
        let last_message = sqlx::query_as::<_, ChatMessage>(&last_sql)
            .bind(conv.id)
            .fetch_optional(pool)
            .await?;

        let (unread_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chat_message WHERE conversation_id = ?1 AND sender_id != ?2 AND read_at IS NULL",
        )
        .bind(conv.id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        details.push(ConversationDetail {
            conversation: conv,
            peer,
            last_message,
            unread_count,
        });
    }
    Ok(details)
}

/// 历史消息：keyset 分页，sent_at 降序
pub async fn history(
    pool: &SqlitePool,
    conversation_id: i64,
    before: Option<i64>,
    limit: i64,
) -> RepoResult<Vec<ChatMessage>> {
    let sql = format!(
        "{} WHERE conversation_id = ?1 AND sent_at < ?2 ORDER BY sent_at DESC LIMIT ?3",
        MSG_SELECT
    );
    let rows = sqlx::query_as::<_, ChatMessage>(&sql)
        .bind(conversation_id)
        .bind(before.unwrap_or(i64::MAX))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 发送消息并推进会话的 last_message_at，单事务。
pub async fn send(
    pool: &SqlitePool,
    conversation_id: i64,
    sender_id: i64,
    content: &str,
) -> RepoResult<ChatMessage> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO chat_message (id, conversation_id, sender_id, content, sent_at, read_at) VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
    )
    .bind(id)
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversation SET last_message_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(ChatMessage {
        id,
        conversation_id,
        sender_id,
        content: content.to_string(),
        sent_at: now,
        read_at: None,
    })
}

/// 把对端发来的所有未读消息标记为已读
pub async fn mark_read(pool: &SqlitePool, conversation_id: i64, reader_id: i64) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE chat_message SET read_at = ?1 WHERE conversation_id = ?2 AND sender_id != ?3 AND read_at IS NULL",
    )
    .bind(now)
    .bind(conversation_id)
    .bind(reader_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() as i64)
}
