//! Route definitions for the readings query surface.
//!
//! Mounted at the root by `build_app_router()`; these paths are what the
//! dashboards already call.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::readings;
use crate::state::AppState;

/// Readings routes.
///
/// ```text
/// GET    /data      -> list_recent
/// GET    /latest    -> get_latest
/// POST   /upload    -> upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/data", get(readings::list_recent))
        .route("/latest", get(readings::get_latest))
        .route("/upload", post(readings::upload))
}
