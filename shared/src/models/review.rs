//! Review Model

use super::booking::BookingItem;
use super::user::UserPublic;
use serde::{Deserialize, Serialize};

/// Review entity (评价) — one per completed booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub booking_id: i64,
    pub user_id: i64,
    pub item: BookingItem,
    /// 1..=5
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Review with author info (list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDetail {
    #[serde(flatten)]
    pub review: Review,
    pub author: UserPublic,
}

/// Create review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub booking_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Aggregate rating for an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub count: i64,
    /// 2 dp average; 0.0 when count == 0
    pub average_rating: f64,
}
