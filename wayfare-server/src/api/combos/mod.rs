//! Service Combo API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_publisher;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 读取路由：公开
    let read_routes = Router::new()
        .route("/api/combos", get(handler::list))
        .route("/api/combos/{id}", get(handler::get_detail));

    // 管理路由：Host/Agency/Admin
    let manage_routes = Router::new()
        .route("/api/combos", post(handler::create))
        .route("/api/combos/mine", get(handler::list_mine))
        .route(
            "/api/combos/{id}",
            put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_publisher));

    read_routes.merge(manage_routes)
}
