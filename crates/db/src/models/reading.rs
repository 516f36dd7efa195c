//! Sensor reading entity (append-only).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vitals_core::payload::ReadingInput;
use vitals_core::types::{DbId, Timestamp};

/// One persisted telemetry sample.
///
/// Serialized with the camelCase keys the sensor devices and dashboards use:
/// `id, timestamp, heartRate, spo2, temperatureC, steps`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub heart_rate: f64,
    pub spo2: f64,
    pub temperature_c: f64,
    pub steps: i64,
}

/// DTO for inserting a new reading. The store assigns `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReading {
    pub heart_rate: f64,
    pub spo2: f64,
    pub temperature_c: f64,
    /// Stored as `0` when `None`.
    pub steps: Option<i64>,
}

impl From<ReadingInput> for CreateReading {
    fn from(input: ReadingInput) -> Self {
        Self {
            heart_rate: input.heart_rate,
            spo2: input.spo2,
            temperature_c: input.temperature_c,
            steps: Some(input.steps),
        }
    }
}
