//! # sixmin-core
//!
//! The deterministic stage-advancement engine for sixmin - THE LOGIC.
//!
//! Given a review item's current stage and its score for that stage, the
//! engine decides whether the item moves one stage forward, when it is next
//! due, and which review target label it should show.
//!
//! ## Components
//!
//! - `table` - the fixed stage → {score field, next stage, interval, label} table
//! - `engine` - one evaluation per item snapshot
//! - `calendar` - whole-day date arithmetic
//!
//! ## Architectural Constraints
//!
//! - Holds no state: items are snapshots, results are values
//! - Never persists anything; the record store owns the data
//! - Has NO async, NO network dependencies, NO clock reads (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod calendar;
pub mod engine;
pub mod primitives;
pub mod table;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Advancement, FieldUpdates, ItemId, ReviewItem, ScheduleError, SkipReason, Stage, Status,
};

// =============================================================================
// RE-EXPORTS: Engine, Table, Calendar
// =============================================================================

pub use calendar::{add_calendar_days, add_calendar_days_iso, format_iso_date, parse_iso_date};
pub use engine::AdvancementEngine;
pub use primitives::THRESHOLD;
pub use table::{StageRule, label_for, next_stage, rule_for, rules, score_field_for};
