//! Coupon API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_publisher;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 校验路由：任何登录用户
    let check_routes = Router::new().route("/api/coupons/check", post(handler::check));

    // 管理路由：Host/Agency/Admin
    let manage_routes = Router::new()
        .route("/api/coupons", get(handler::list_mine).post(handler::create))
        .route("/api/coupons/{id}", put(handler::update))
        .layer(middleware::from_fn(require_publisher));

    check_routes.merge(manage_routes)
}
