//! Notification Model

use serde::{Deserialize, Serialize};

/// Notification kinds.
///
/// 存储为字符串列（kind），读取侧原样透传；`as_str` 是唯一写入口。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    BookingCreated,
    BookingStatus,
    PaymentResult,
    CouponApplied,
    ReviewReceived,
    PostLiked,
    PostCommented,
    ChatMessage,
    UpgradeReviewed,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingCreated => "BOOKING_CREATED",
            NotificationKind::BookingStatus => "BOOKING_STATUS",
            NotificationKind::PaymentResult => "PAYMENT_RESULT",
            NotificationKind::CouponApplied => "COUPON_APPLIED",
            NotificationKind::ReviewReceived => "REVIEW_RECEIVED",
            NotificationKind::PostLiked => "POST_LIKED",
            NotificationKind::PostCommented => "POST_COMMENTED",
            NotificationKind::ChatMessage => "CHAT_MESSAGE",
            NotificationKind::UpgradeReviewed => "UPGRADE_REVIEWED",
            NotificationKind::System => "SYSTEM",
        }
    }
}

/// Notification entity (通知)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub body: String,
    /// 关联资源 ID（预订/支付/帖子等，按 kind 解释）
    pub ref_id: Option<i64>,
    pub is_read: bool,
    pub created_at: i64,
}

/// Unread counter response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread: i64,
}
