//! 认证授权模块
//!
//! 提供 JWT 认证、角色检查和限流中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件
//! - [`require_role`] - 角色检查中间件
//! - [`RateLimiter`] - 登录/注册限流

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_publisher};
pub use rate_limit::RateLimiter;
