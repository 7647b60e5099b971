//! Payment API 模块

mod handler;
mod webhook;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payments/checkout", post(handler::checkout))
        .route("/api/payments/mine", get(handler::list_mine))
        .route("/api/payments/{id}", get(handler::get_by_id))
        // 签名认证，全局中间件放行
        .route("/api/payments/webhook", post(webhook::handle_webhook))
}
