//! Service Combo Model

use serde::{Deserialize, Serialize};

/// Service combo entity (服务套餐) — a bundled package of services sold as
/// one bookable unit at its own price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ServiceCombo {
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// 套餐自主定价，不由子项价格推导
    pub price: f64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Combo line item: which service, how many units
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ComboItem {
    pub combo_id: i64,
    pub service_id: i64,
    pub quantity: i64,
}

/// Combo item with resolved service info (detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ComboItemDetail {
    pub service_id: i64,
    pub service_title: String,
    pub service_price: f64,
    pub quantity: i64,
}

/// Combo with resolved items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboDetail {
    #[serde(flatten)]
    pub combo: ServiceCombo,
    pub items: Vec<ComboItemDetail>,
}

/// Create combo payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboCreate {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub items: Vec<ComboItemInput>,
}

/// Combo item input for create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboItemInput {
    pub service_id: i64,
    pub quantity: i64,
}

/// Update combo payload (items, when present, replace the whole set)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub items: Option<Vec<ComboItemInput>>,
}
