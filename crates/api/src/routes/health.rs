use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use vitals_db::repositories::ReadingRepo;
use vitals_ingest::status::{IngestStats, ListenerState};

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the Reading Store is reachable.
    pub db_healthy: bool,
    /// Connection state of the ingestion listener.
    pub listener: ListenerState,
    /// Number of stored readings (`null` if the store is unreachable).
    pub readings: Option<i64>,
    /// Ingestion counters since startup.
    pub ingest: IngestStats,
}

/// GET /health -- returns service, store and listener health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = vitals_db::health_check(&state.pool).await.is_ok();
    let readings = if db_healthy {
        ReadingRepo::count(&state.pool).await.ok()
    } else {
        None
    };
    let listener = state.listener.state();

    let status = if db_healthy && listener == ListenerState::Connected {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        listener,
        readings,
        ingest: state.listener.stats(),
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
