//! Authentication Handlers
//!
//! Handles registration, login, and profile management

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{
    self, MAX_PASSWORD_LEN, MAX_TITLE_LEN, MAX_URL_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN,
};
use crate::{AppError, AppResult};
use shared::models::{
    LoginRequest, LoginResponse, PasswordChange, ProfileUpdate, RegisterRequest, User, UserPublic,
};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn public_profile(user: &User) -> UserPublic {
    UserPublic {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        avatar_url: user.avatar_url.clone(),
        role: user.role,
    }
}

/// Client IP for rate limiting: X-Forwarded-For first (reverse proxy),
/// else one shared bucket for direct connections.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "direct".to_string())
}

fn check_rate_limit(state: &ServerState, headers: &HeaderMap) -> AppResult<()> {
    let ip = client_ip(headers);
    if !state.rate_limiter.check("auth", &ip, 10, 60) {
        tracing::warn!(ip = %ip, "Rate limit exceeded on auth route");
        return Err(AppError::RateLimited);
    }
    Ok(())
}

/// POST /api/auth/register - 注册 (角色固定 Tourist)
pub async fn register(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<LoginResponse>> {
    check_rate_limit(&state, &headers)?;

    validation::validate_required_text(&req.username, "username", MAX_USERNAME_LEN)?;
    validation::validate_email(&req.email)?;
    validation::validate_required_text(&req.display_name, "display_name", MAX_TITLE_LEN)?;
    if req.password.len() < MIN_PASSWORD_LEN || req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        )));
    }

    if user::find_by_username(&state.pool, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Username already taken"));
    }
    if user::find_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let created = user::create(
        &state.pool,
        &req.username,
        &req.email,
        &password_hash,
        &req.display_name,
    )
    .await?;

    let token = state
        .get_jwt_service()
        .generate_token(&created)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = created.id, username = %created.username, "User registered");

    Ok(Json(LoginResponse {
        token,
        user: public_profile(&created),
    }))
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    check_rate_limit(&state, &headers)?;

    let found = user::find_by_username(&state.pool, &req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let account = match found {
        Some(u) => {
            if !u.is_active {
                return Err(AppError::forbidden("Account has been disabled".to_string()));
            }

            let password_valid = verify_password(&req.password, &u.password_hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .get_jwt_service()
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = account.role.as_str(),
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: public_profile(&account),
    }))
}

/// GET /api/auth/me - 当前用户完整资料
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let user = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;
    Ok(Json(user))
}

/// POST /api/auth/logout - 无状态 JWT，仅供客户端语义
pub async fn logout(current_user: CurrentUser) -> AppResult<Json<bool>> {
    tracing::info!(user_id = current_user.id, "User logged out");
    Ok(Json(true))
}

/// PUT /api/auth/profile - 更新显示名/头像
pub async fn update_profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    if let Some(name) = &req.display_name {
        validation::validate_required_text(name, "display_name", MAX_TITLE_LEN)?;
    }
    validation::validate_optional_text(&req.avatar_url, "avatar_url", MAX_URL_LEN)?;

    let updated = user::update_profile(
        &state.pool,
        current_user.id,
        req.display_name.as_deref(),
        req.avatar_url.as_deref(),
    )
    .await?;
    Ok(Json(updated))
}

/// PUT /api/auth/password - 修改密码 (验证旧密码)
pub async fn change_password(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<PasswordChange>,
) -> AppResult<Json<bool>> {
    if req.new_password.len() < MIN_PASSWORD_LEN || req.new_password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        )));
    }

    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    let old_valid = verify_password(&req.old_password, &account.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !old_valid {
        return Err(AppError::invalid_credentials());
    }

    let new_hash = hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
    user::update_password(&state.pool, current_user.id, &new_hash).await?;

    tracing::info!(user_id = current_user.id, "Password changed");
    Ok(Json(true))
}
