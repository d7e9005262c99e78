//! # Core Type Definitions
//!
//! This module contains all core types for the sixmin advancement engine:
//! - Review stages and statuses (`Stage`, `Status`)
//! - Item snapshots (`ItemId`, `ReviewItem`)
//! - Evaluation output (`Advancement`, `SkipReason`, `FieldUpdates`)
//! - Error types (`ScheduleError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Carry date-only values (`NaiveDate`), never wall-clock time
//! - Use `BTreeMap` for per-field scores so iteration order is stable
//! - Implement `PartialEq` so evaluation results can be compared directly

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::table;

// =============================================================================
// STAGE
// =============================================================================

/// One step of the review schedule.
///
/// Stages are totally ordered: each one is reviewed less often than the one
/// before it. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    D1,
    D3,
    D7,
    D14,
    D30,
    Done,
}

impl Stage {
    /// Every stage in schedule order.
    pub const ALL: [Stage; 6] = [
        Stage::D1,
        Stage::D3,
        Stage::D7,
        Stage::D14,
        Stage::D30,
        Stage::Done,
    ];

    /// Position in the schedule, used to index the stage table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Stage::D1 => 0,
            Stage::D3 => 1,
            Stage::D7 => 2,
            Stage::D14 => 3,
            Stage::D30 => 4,
            Stage::Done => 5,
        }
    }

    /// Name as stored in the record store's stage field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Stage::D1 => "D1",
            Stage::D3 => "D3",
            Stage::D7 => "D7",
            Stage::D14 => "D14",
            Stage::D30 => "D30",
            Stage::Done => "Done",
        }
    }

    /// Parse a stage name exactly as stored. Returns `None` for anything else.
    #[must_use]
    pub fn parse(name: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.name() == name.trim())
    }

    /// Check if this stage is terminal (`Done`).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Lifecycle status written alongside the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The item is still moving through the schedule.
    Reviewing,
    /// The item reached the terminal stage.
    Done,
}

impl Status {
    /// Status implied by entering `stage`.
    #[must_use]
    pub const fn for_stage(stage: Stage) -> Status {
        if stage.is_terminal() {
            Status::Done
        } else {
            Status::Reviewing
        }
    }

    /// Name as stored in the record store's status field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Status::Reviewing => "Reviewing",
            Status::Done => "Done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// REVIEW ITEM
// =============================================================================

/// Identifier of an item in the external record store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create a new identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of one learnable unit as read from the record store.
///
/// Scores are keyed by the score field name of the stage table. A missing
/// score reads as 0. A missing stage reads as `D1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    /// Date the next interval is counted from. Evaluation falls back to
    /// "today" when absent.
    #[serde(default)]
    pub anchor_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_reviewed: Option<NaiveDate>,
    #[serde(default)]
    pub next_review: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub target_label: Option<String>,
    /// Stage name as stored when it is not one of the known stages. `stage`
    /// then reads as `D1`. Stores write this name back unchanged until the
    /// item advances.
    #[serde(skip)]
    pub unrecognized_stage: Option<String>,
}

impl ReviewItem {
    /// Create an uninitialized item with no stage and no scores.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            title: None,
            stage: None,
            scores: BTreeMap::new(),
            anchor_date: None,
            last_reviewed: None,
            next_review: None,
            status: None,
            target_label: None,
            unrecognized_stage: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set the score recorded for `stage`. Ignored for the terminal stage,
    /// which has no score field.
    #[must_use]
    pub fn with_score(mut self, stage: Stage, score: f64) -> Self {
        if let Some(field) = table::score_field_for(stage) {
            self.scores.insert(field.to_string(), score);
        }
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor_date = Some(anchor);
        self
    }

    #[must_use]
    pub fn with_target_label(mut self, label: impl Into<String>) -> Self {
        self.target_label = Some(label.into());
        self
    }

    /// Score stored under `field`, with absent or non-finite values read as 0.
    #[must_use]
    pub fn score(&self, field: &str) -> f64 {
        self.scores
            .get(field)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Human-readable name for logs: the title if present, else the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

// =============================================================================
// FIELD UPDATES
// =============================================================================

/// Full set of logical field writes produced by one advancement.
///
/// Every field is always present, so applying the same updates twice leaves
/// the record in the same state as applying them once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdates {
    pub stage: Stage,
    pub status: Status,
    pub last_reviewed: NaiveDate,
    pub target_label: &'static str,
    /// `None` clears the field (terminal stage).
    pub next_review: Option<NaiveDate>,
}

impl FieldUpdates {
    /// Write these updates into an in-memory snapshot.
    pub fn apply_to(&self, item: &mut ReviewItem) {
        item.stage = Some(self.stage);
        item.unrecognized_stage = None;
        item.status = Some(self.status);
        item.last_reviewed = Some(self.last_reviewed);
        item.target_label = Some(self.target_label.to_string());
        item.next_review = self.next_review;
    }
}

// =============================================================================
// ADVANCEMENT RESULT
// =============================================================================

/// Why an evaluation produced no updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The item is already at `Done`.
    AlreadyTerminal,
    /// The current stage's score is under the threshold.
    BelowThreshold { score: f64, threshold: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyTerminal => write!(f, "already {}", Stage::Done),
            SkipReason::BelowThreshold { score, threshold } => {
                write!(f, "score {} < {}", score, threshold)
            }
        }
    }
}

/// Output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advancement {
    /// No change. Nothing must be written back.
    Skipped { reason: SkipReason },
    /// The item moves exactly one stage forward.
    Advanced {
        from: Stage,
        to: Stage,
        score: f64,
        updates: FieldUpdates,
    },
}

impl Advancement {
    #[must_use]
    pub fn is_advanced(&self) -> bool {
        matches!(self, Advancement::Advanced { .. })
    }

    /// The field writes to apply, if any.
    #[must_use]
    pub fn updates(&self) -> Option<&FieldUpdates> {
        match self {
            Advancement::Advanced { updates, .. } => Some(updates),
            Advancement::Skipped { .. } => None,
        }
    }

    /// The skip reason, if the item did not advance.
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Advancement::Skipped { reason } => Some(*reason),
            Advancement::Advanced { .. } => None,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the date helpers.
///
/// Evaluation itself never fails; these only surface when parsing or
/// formatting dates at the edges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The input is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Adding the interval leaves the representable calendar range.
    #[error("Date overflow: {date} + {days} days")]
    DateOverflow { date: NaiveDate, days: u32 },
}

// =============================================================================
// TESTS
// =============================================================================
