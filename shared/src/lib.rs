//! Shared types for the Wayfare platform
//!
//! Domain models and utility types used by the server and by
//! integration tests. Database support (`sqlx::FromRow` derives) is
//! feature-gated behind `db` so lightweight consumers stay ORM-free.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
