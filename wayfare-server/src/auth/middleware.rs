//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (静态上传目录等，让它们正常返回)
/// - `/api/auth/login`、`/api/auth/register`、`/api/health`
/// - `/api/payments/webhook` (签名认证)
/// - 公开目录读取: GET `/api/services*`、`/api/combos*`、`/api/reviews/item*`
///   (不含 `/mine` 后缀的自有列表)
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证。目录读取公开，但 `/mine` 列表除外。
    let is_public_catalog = req.method() == http::Method::GET
        && (path.starts_with("/api/services")
            || path.starts_with("/api/combos")
            || path.starts_with("/api/reviews/item"))
        && !path.ends_with("/mine");
    let is_public_api_route = path == "/api/auth/login"
        || path == "/api/auth/register"
        || path == "/api/health"
        || path == "/api/payments/webhook"
        || is_public_catalog;
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 管理员中间件 - 要求管理员角色
///
/// # 错误
///
/// 非管理员返回 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone()
        );
        return Err(AppError::forbidden("Admin role required".to_string()));
    }

    Ok(next.run(req).await)
}

/// 发布者中间件 - 要求 Host/Agency/Admin 角色
///
/// 发布服务、套餐、优惠券的路由使用。
pub async fn require_publisher(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.can_publish() {
        security_log!(
            "WARN",
            "publisher_required",
            user_id = user.id,
            username = user.username.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::forbidden(
            "Host or Agency role required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
