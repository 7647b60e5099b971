//! Chat Model

use super::user::UserPublic;
use serde::{Deserialize, Serialize};

/// Conversation entity (会话)
///
/// 参与者归一化存储：user_a < user_b，(user_a, user_b) 唯一。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Conversation {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub created_at: i64,
    pub last_message_at: i64,
}

/// Chat message entity (消息)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub sent_at: i64,
    /// None = 未读
    pub read_at: Option<i64>,
}

/// Conversation list entry: peer + last message preview + unread count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub peer: UserPublic,
    pub last_message: Option<ChatMessage>,
    pub unread_count: i64,
}

/// Send message payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// History pagination (keyset: sent_at before cursor, newest first)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub before: Option<i64>,
    pub limit: Option<i64>,
}
