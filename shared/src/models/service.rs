//! Service Model

use serde::{Deserialize, Serialize};

/// Service entity (单项服务) — an individually bookable offering owned by
/// a host or agency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Service {
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// 自由分类标签，如 "tour" / "stay" / "transport"
    pub category: Option<String>,
    /// Unit price in currency unit
    pub price: f64,
    /// 计价单位，如 "person" / "night" / "trip"
    pub unit: String,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create service payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCreate {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

/// Update service payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// List filter (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceFilter {
    pub category: Option<String>,
    pub host_id: Option<i64>,
    /// 标题模糊搜索
    pub q: Option<String>,
}
