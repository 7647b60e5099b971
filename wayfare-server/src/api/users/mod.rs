//! User Admin API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 公开资料：登录即可查看
    let read_routes = Router::new().route("/api/users/{id}", get(handler::get_public));

    // 管理路由：仅 admin
    let manage_routes = Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users/{id}/active", put(handler::set_active))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
