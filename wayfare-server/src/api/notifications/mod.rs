//! Notification API 模块

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/notifications", get(handler::list))
        .route("/api/notifications/unread-count", get(handler::unread_count))
        .route("/api/notifications/{id}/read", post(handler::mark_read))
        .route("/api/notifications/read-all", post(handler::mark_all_read))
}
