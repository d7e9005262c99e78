//! # Innate Primitives
//!
//! Hardcoded runtime constants for the sixmin CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! The stage table itself lives in [`crate::table`].

/// Minimum score required to leave the current stage.
///
/// Scores are on a 0–100 scale and compared with `>=`, so a score of
/// exactly `THRESHOLD` advances.
pub const THRESHOLD: f64 = 70.0;

/// Upper bound for a single interval, in days.
///
/// Every entry of the stage table must stay at or below this value.
pub const MAX_INTERVAL_DAYS: u32 = 366;

/// Wire format for date-only values (`YYYY-MM-DD`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
