//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post, routing::put};

use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/register, /api/auth/login: public (限流在 handler 内)
/// - 其余路由由全局 require_auth 中间件保护
pub fn router() -> Router<ServerState> {
    Router::new()
        // Public routes - no auth middleware applied
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        // Protected routes - require authentication (handled by global require_auth middleware)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/profile", put(handler::update_profile))
        .route("/api/auth/password", put(handler::change_password))
}
