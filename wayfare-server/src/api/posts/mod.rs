//! Post API 模块 (社交动态)

mod handler;

use axum::{Router, routing::{get, post, put}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/posts/feed", get(handler::feed))
        .route("/api/posts", post(handler::create))
        .route(
            "/api/posts/{id}",
            get(handler::get_by_id).delete(handler::delete),
        )
        .route(
            "/api/posts/{id}/comments",
            get(handler::list_comments).post(handler::add_comment),
        )
        .route(
            "/api/posts/{id}/like",
            put(handler::like).delete(handler::unlike),
        )
}
