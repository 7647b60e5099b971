//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册/登录/个人资料
//! - [`users`] - 用户管理 (admin)
//! - [`services`] - 服务目录
//! - [`combos`] - 服务套餐
//! - [`coupons`] - 优惠券管理与校验
//! - [`bookings`] - 预订与状态流转
//! - [`payments`] - 支付与网关回调
//! - [`reviews`] - 评价
//! - [`posts`] - 社交动态
//! - [`chat`] - 私信
//! - [`notifications`] - 通知
//! - [`upgrades`] - 资质升级审批
//! - [`upload`] - 图片上传
//! - [`statistics`] - 统计报表

pub mod auth;
pub mod health;
pub mod upload;
pub mod users;

// Catalog
pub mod combos;
pub mod services;

// Booking domain
pub mod bookings;
pub mod coupons;
pub mod payments;

// Social
pub mod chat;
pub mod posts;
pub mod reviews;

// Platform
pub mod notifications;
pub mod statistics;
pub mod upgrades;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ok};

/// Create the combined router
pub fn create_router(state: ServerState) -> Router {
    let uploads_dir = state.config.uploads_dir();

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(services::router())
        .merge(combos::router())
        .merge(coupons::router())
        .merge(bookings::router())
        .merge(payments::router())
        .merge(reviews::router())
        .merge(posts::router())
        .merge(chat::router())
        .merge(notifications::router())
        .merge(upgrades::router())
        .merge(upload::router())
        .merge(statistics::router())
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
