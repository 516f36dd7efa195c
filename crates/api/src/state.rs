use vitals_ingest::status::ListenerHandle;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the pool and the listener handle are both
/// reference-counted).
#[derive(Clone)]
pub struct AppState {
    /// Reading Store connection pool.
    pub pool: vitals_db::DbPool,
    /// Live status of the ingestion listener (connection state, counters).
    pub listener: ListenerHandle,
}
