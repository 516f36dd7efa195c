//! Handlers for the readings query surface.
//!
//! - `GET /data`    recent readings, newest first
//! - `GET /latest`  the single most recent reading
//! - `POST /upload` direct write that bypasses the message channel

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use vitals_core::error::CoreError;
use vitals_core::limits::{clamp_limit, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
use vitals_core::payload::{decode_value, DecodeMode};
use vitals_core::types::DbId;
use vitals_db::models::reading::{CreateReading, Reading};
use vitals_db::repositories::ReadingRepo;

use crate::error::{AppError, AppResult};
use crate::query::{RecentReadingsParams, SortOrder};
use crate::state::AppState;

/// Confirmation returned by `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub id: DbId,
}

/// GET /data
///
/// Up to `limit` (default 10, max 100) most recent readings. Newest first
/// unless `order=oldest` is given, which returns the same window reversed.
pub async fn list_recent(
    State(state): State<AppState>,
    params: Result<Query<RecentReadingsParams>, QueryRejection>,
) -> AppResult<Json<Vec<Reading>>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let limit = clamp_limit(params.limit, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT);

    let mut readings = ReadingRepo::fetch_latest(&state.pool, limit).await?;
    if params.order == SortOrder::Oldest {
        readings.reverse();
    }
    Ok(Json(readings))
}

/// GET /latest
///
/// 404 when nothing has been stored yet.
pub async fn get_latest(State(state): State<AppState>) -> AppResult<Json<Reading>> {
    let reading = ReadingRepo::fetch_latest_one(&state.pool)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound("No data yet".to_string())))?;
    Ok(Json(reading))
}

/// POST /upload
///
/// Body: `{"heartRate", "spo2", "temperatureC", "steps"?}`. Any content type
/// is accepted as long as the body is a JSON object. Missing required fields
/// are a 400 and nothing is written.
///
/// Readings written here are NOT passed through the plausibility check.
pub async fn upload(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<UploadResponse>> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Request body must be a JSON object".to_string()))?;
    let input = decode_value(&value, DecodeMode::Strict)?;

    let reading = ReadingRepo::insert(&state.pool, &CreateReading::from(input)).await?;
    tracing::info!(
        id = reading.id,
        heart_rate = reading.heart_rate,
        spo2 = reading.spo2,
        "Stored reading from direct upload",
    );

    Ok(Json(UploadResponse {
        status: "ok",
        id: reading.id,
    }))
}
