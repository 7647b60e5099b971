//! Chat API 模块

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/chat/with/{user_id}", post(handler::open))
        .route("/api/chat/conversations", get(handler::list_conversations))
        .route(
            "/api/chat/conversations/{id}/messages",
            get(handler::history).post(handler::send),
        )
        .route("/api/chat/conversations/{id}/read", post(handler::mark_read))
}
