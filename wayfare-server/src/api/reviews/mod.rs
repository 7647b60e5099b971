//! Review API 模块

mod handler;

use axum::{Router, routing::{delete, get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        // 公开读取 (全局中间件放行 GET /api/reviews/item*)
        .route("/api/reviews/item/{kind}/{id}", get(handler::list_for_item))
        .route(
            "/api/reviews/item/{kind}/{id}/summary",
            get(handler::item_summary),
        )
        // 登录用户
        .route("/api/reviews", post(handler::create))
        .route("/api/reviews/{id}", delete(handler::delete))
}
