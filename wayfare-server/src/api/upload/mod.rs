//! Upload Routes
//!
//! Image upload endpoints for authenticated users; files are served
//! statically from `/uploads/<category>/` by the router's `ServeDir`.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/upload/{category}", post(handler::upload))
}
