//! Booking API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/api/bookings", post(handler::create))
        .route("/api/bookings/quote", post(handler::quote))
        .route("/api/bookings/mine", get(handler::list_mine))
        .route("/api/bookings/host", get(handler::list_for_host))
        .route("/api/bookings/{id}", get(handler::get_by_id))
        .route("/api/bookings/{id}/status", post(handler::change_status))
        .route(
            "/api/bookings/{id}/coupon",
            post(handler::apply_coupon).delete(handler::remove_coupon),
        );

    // 全量列表：仅 admin
    let admin_routes = Router::new()
        .route("/api/bookings", get(handler::list_all))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(admin_routes)
}
