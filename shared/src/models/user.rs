//! User Model

use serde::{Deserialize, Serialize};

/// Platform roles (JWT `role` claim)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum Role {
    Admin,
    Host,
    Agency,
    Tourist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Host => "HOST",
            Role::Agency => "AGENCY",
            Role::Tourist => "TOURIST",
        }
    }

    /// 能否发布服务/套餐
    pub fn can_publish(&self) -> bool {
        matches!(self, Role::Admin | Role::Host | Role::Agency)
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "HOST" => Ok(Role::Host),
            "AGENCY" => Ok(Role::Agency),
            "TOURIST" => Ok(Role::Tourist),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// User entity (用户)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// argon2 哈希，永不序列化到响应
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    /// 忠诚度等级，从 1 开始，随完成的预订提升
    pub level: i64,
    /// 已完成预订计数 (每 5 个提升一级)
    pub completed_bookings: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public user info (safe to embed in feeds / chat / reviews)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
}

/// Register payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response: token + profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

/// Profile update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Password change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}
