//! Post Model (social feed)

use super::user::UserPublic;
use serde::{Deserialize, Serialize};

/// Post entity (动态)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    /// 存储为 JSON 数组列
    pub image_urls: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Feed entry: post + author + counters + caller's like state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author: UserPublic,
    pub like_count: i64,
    pub comment_count: i64,
    pub liked_by_me: bool,
}

/// Create post payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreate {
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Comment entity (评论)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PostComment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: i64,
}

/// Comment with author info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCommentDetail {
    #[serde(flatten)]
    pub comment: PostComment,
    pub author: UserPublic,
}

/// Create comment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCommentCreate {
    pub content: String,
}

/// Feed pagination (keyset: created_at before cursor)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    pub before: Option<i64>,
    pub limit: Option<i64>,
}
