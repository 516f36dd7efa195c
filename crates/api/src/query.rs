//! Query parameter types for API handlers.

use serde::Deserialize;

/// Direction of a recent-readings window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently inserted first.
    #[default]
    Newest,
    /// The same window, oldest first (convenient for charts).
    Oldest,
}

/// Parameters for `GET /data` (`?limit=&order=`).
///
/// `limit` is clamped via `vitals_core::limits::clamp_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct RecentReadingsParams {
    pub limit: Option<i64>,
    #[serde(default)]
    pub order: SortOrder,
}
