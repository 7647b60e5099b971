//! Notification dispatch
//!
//! Fire-and-forget：通知写入失败只记日志，绝不让宿主操作失败。

use sqlx::SqlitePool;

use crate::db::repository::notification;
use shared::models::NotificationKind;

#[derive(Clone)]
pub struct Notifier {
    pool: SqlitePool,
}

impl Notifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 给用户投递一条通知。失败时记录并丢弃。
    pub async fn notify(
        &self,
        user_id: i64,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        ref_id: Option<i64>,
    ) {
        let title = title.into();
        let body = body.into();
        if let Err(e) =
            notification::create(&self.pool, user_id, kind.as_str(), &title, &body, ref_id).await
        {
            tracing::warn!(
                user_id = user_id,
                kind = kind.as_str(),
                error = %e,
                "Failed to deliver notification"
            );
        }
    }
}
