//! Bounds for "recent readings" queries.

/// Number of readings returned by `/data` when no limit is given.
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Largest window a single `/data` request may ask for.
pub const MAX_RECENT_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}
