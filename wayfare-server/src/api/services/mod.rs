//! Service API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_publisher;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 读取路由：公开 (全局中间件放行 GET /api/services*)
    let read_routes = Router::new()
        .route("/api/services", get(handler::list))
        .route("/api/services/{id}", get(handler::get_by_id));

    // 管理路由：Host/Agency/Admin
    let manage_routes = Router::new()
        .route("/api/services", post(handler::create))
        .route("/api/services/mine", get(handler::list_mine))
        .route(
            "/api/services/{id}",
            put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_publisher));

    read_routes.merge(manage_routes)
}
