//! Data models
//!
//! Shared between wayfare-server and its integration tests.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! Unix millis.

pub mod booking;
pub mod chat;
pub mod combo;
pub mod coupon;
pub mod notification;
pub mod payment;
pub mod post;
pub mod review;
pub mod service;
pub mod upgrade;
pub mod user;

// Re-exports
pub use booking::*;
pub use chat::*;
pub use combo::*;
pub use coupon::*;
pub use notification::*;
pub use payment::*;
pub use post::*;
pub use review::*;
pub use service::*;
pub use upgrade::*;
pub use user::*;
