//! Certificate Upgrade API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/api/upgrades", post(handler::submit))
        .route("/api/upgrades/mine", get(handler::list_mine));

    // 审批路由：仅 admin
    let admin_routes = Router::new()
        .route("/api/upgrades", get(handler::list_all))
        .route("/api/upgrades/{id}/review", post(handler::review))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(admin_routes)
}
