//! Domain logic for the vitals telemetry pipeline.
//!
//! Pure code only: no database or network access. The ingest listener and
//! the HTTP layer both build on these types.

pub mod error;
pub mod limits;
pub mod payload;
pub mod types;
pub mod validation;
