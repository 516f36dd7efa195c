//! Repository for the `readings` table (append-only time-series).

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::reading::{CreateReading, Reading};

/// Column list for `readings` SELECT queries.
const COLUMNS: &str = "id, timestamp, heart_rate, spo2, temperature_c, steps";

/// Provides insert and recency queries for readings.
///
/// There are no update or delete operations.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Append a reading stamped with the current UTC time.
    ///
    /// The row is committed before this returns; the returned [`Reading`]
    /// carries the assigned `id`.
    pub async fn insert(pool: &SqlitePool, input: &CreateReading) -> Result<Reading, sqlx::Error> {
        let query = format!(
            "INSERT INTO readings (timestamp, heart_rate, spo2, temperature_c, steps) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(Utc::now())
            .bind(input.heart_rate)
            .bind(input.spo2)
            .bind(input.temperature_c)
            .bind(input.steps.unwrap_or(0))
            .fetch_one(pool)
            .await
    }

    /// Up to `limit` most recently inserted readings, newest first.
    ///
    /// A non-positive `limit` yields an empty list (SQLite would otherwise
    /// treat a negative LIMIT as "no limit").
    pub async fn fetch_latest(pool: &SqlitePool, limit: i64) -> Result<Vec<Reading>, sqlx::Error> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM readings ORDER BY id DESC LIMIT ?1");
        sqlx::query_as::<_, Reading>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The single most recently inserted reading, if any.
    pub async fn fetch_latest_one(pool: &SqlitePool) -> Result<Option<Reading>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM readings ORDER BY id DESC LIMIT 1");
        sqlx::query_as::<_, Reading>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Total number of stored readings.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM readings")
            .fetch_one(pool)
            .await
    }
}
