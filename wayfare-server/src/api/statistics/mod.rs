//! Statistics API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{require_admin, require_publisher};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route("/api/statistics/overview", get(handler::overview))
        .layer(middleware::from_fn(require_admin));

    let host_routes = Router::new()
        .route("/api/statistics/host", get(handler::host_overview))
        .layer(middleware::from_fn(require_publisher));

    admin_routes.merge(host_routes)
}
