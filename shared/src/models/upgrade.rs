//! Certificate Upgrade Model
//!
//! 游客提交资质材料申请升级为 Host/Agency，管理员审核。

use super::user::Role;
use serde::{Deserialize, Serialize};

/// Upgrade request lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum UpgradeStatus {
    Pending,
    Approved,
    Rejected,
}

/// Upgrade request entity (升级申请)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeRequest {
    pub id: i64,
    pub user_id: i64,
    /// 目标角色，只能是 Host 或 Agency
    pub target_role: Role,
    /// 证书/资质文件 URL，JSON 数组列
    pub document_urls: Vec<String>,
    pub note: Option<String>,
    pub status: UpgradeStatus,
    pub fee_paid: bool,
    pub reviewed_by: Option<i64>,
    pub review_note: Option<String>,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
}

/// Submit payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeSubmit {
    pub target_role: Role,
    pub document_urls: Vec<String>,
    pub note: Option<String>,
}

/// Admin review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeReview {
    pub approve: bool,
    pub review_note: Option<String>,
}
