//! # Advancement Engine
//!
//! Decides, for one item snapshot and one calendar day, whether the item
//! leaves its current stage and what must be written back if it does.
//!
//! - Pure: no I/O, no clock reads, no shared state
//! - At most one stage per evaluation
//! - Items below the threshold produce no writes at all, even when their
//!   label is stale (label repair is a separate pass in the driver)

use chrono::NaiveDate;

use crate::calendar::add_calendar_days;
use crate::primitives::THRESHOLD;
use crate::table::{label_for, next_stage, rule_for};
use crate::{Advancement, FieldUpdates, ReviewItem, SkipReason, Stage, Status};

/// The Advancement Engine evaluates one item against the stage table.
pub struct AdvancementEngine;

impl AdvancementEngine {
    /// Evaluate `item` as of `today`.
    ///
    /// An item without a stage is treated as `D1`. The next review date is
    /// counted from the item's anchor date, or from `today` when the item
    /// has none, and saturates at the last representable date.
    #[must_use]
    pub fn evaluate(item: &ReviewItem, today: NaiveDate) -> Advancement {
        let current = item.stage.unwrap_or(Stage::D1);

        let Some(rule) = rule_for(current) else {
            return Advancement::Skipped {
                reason: SkipReason::AlreadyTerminal,
            };
        };

        let score = item.score(rule.score_field);
        if score < THRESHOLD {
            return Advancement::Skipped {
                reason: SkipReason::BelowThreshold {
                    score,
                    threshold: THRESHOLD,
                },
            };
        }

        let next = next_stage(current);
        let next_review = if next.is_terminal() {
            None
        } else {
            let anchor = item.anchor_date.unwrap_or(today);
            Some(add_calendar_days(anchor, rule.interval_days).unwrap_or(NaiveDate::MAX))
        };

        Advancement::Advanced {
            from: current,
            to: next,
            score,
            updates: FieldUpdates {
                stage: next,
                status: Status::for_stage(next),
                last_reviewed: today,
                target_label: label_for(next),
                next_review,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_iso_date;

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).expect("date")
    }

    #[test]
    fn advances_d1_at_79() {
        let item = ReviewItem::new("p1")
            .with_stage(Stage::D1)
            .with_score(Stage::D1, 79.0)
            .with_anchor(date("2025-03-10"));

        let result = AdvancementEngine::evaluate(&item, date("2025-03-12"));
        assert!(matches!(
            result,
            Advancement::Advanced {
                from: Stage::D1,
                to: Stage::D3,
                ..
            }
        ));
        if let Advancement::Advanced { score, .. } = &result {
            assert_eq!(*score, 79.0);
        }

        let updates = result.updates().expect("advanced");
        assert_eq!(updates.stage, Stage::D3);
        assert_eq!(updates.status, Status::Reviewing);
        assert_eq!(updates.next_review, Some(date("2025-03-12")));
        assert_eq!(updates.last_reviewed, date("2025-03-12"));
        assert_eq!(updates.target_label, "能表达");
    }

    #[test]
    fn anchor_defaults_to_today() {
        let item = ReviewItem::new("p1")
            .with_stage(Stage::D7)
            .with_score(Stage::D7, 90.0);

        let result = AdvancementEngine::evaluate(&item, date("2025-01-28"));
        let updates = result.updates().expect("advanced");
        assert_eq!(updates.next_review, Some(date("2025-02-04")));
    }

    #[test]
    fn last_stage_enters_done() {
        let item = ReviewItem::new("p1")
            .with_stage(Stage::D30)
            .with_score(Stage::D30, 90.0);

        let result = AdvancementEngine::evaluate(&item, date("2025-05-01"));
        let updates = result.updates().expect("advanced");
        assert_eq!(updates.stage, Stage::Done);
        assert_eq!(updates.status, Status::Done);
        assert_eq!(updates.next_review, None);
        assert_eq!(updates.target_label, "已完成");
    }

    #[test]
    fn below_threshold_skips_without_updates() {
        let item = ReviewItem::new("p1")
            .with_stage(Stage::D1)
            .with_score(Stage::D1, 65.0)
            .with_target_label("wrong label");

        let result = AdvancementEngine::evaluate(&item, date("2025-05-01"));
        assert!(result.updates().is_none());
        let reason = result.skip_reason().expect("skipped").to_string();
        assert!(reason.contains("65"), "reason was {reason}");
    }

    #[test]
    fn threshold_boundary() {
        let today = date("2025-05-01");
        let at = ReviewItem::new("a").with_score(Stage::D1, 70.0);
        let under = ReviewItem::new("b").with_score(Stage::D1, 69.0);

        assert!(AdvancementEngine::evaluate(&at, today).is_advanced());
        assert!(!AdvancementEngine::evaluate(&under, today).is_advanced());
    }

    #[test]
    fn terminal_never_advances() {
        let mut item = ReviewItem::new("p1").with_stage(Stage::Done);
        for stage in Stage::ALL {
            item = item.with_score(stage, 100.0);
        }

        let result = AdvancementEngine::evaluate(&item, date("2025-05-01"));
        assert_eq!(
            result,
            Advancement::Skipped {
                reason: SkipReason::AlreadyTerminal
            }
        );
    }

    #[test]
    fn reads_only_current_stage_score() {
        let item = ReviewItem::new("p1")
            .with_stage(Stage::D3)
            .with_score(Stage::D1, 100.0)
            .with_score(Stage::D7, 100.0);

        assert!(!AdvancementEngine::evaluate(&item, date("2025-05-01")).is_advanced());
    }

    #[test]
    fn high_score_advances_one_stage_only() {
        let item = ReviewItem::new("p1")
            .with_stage(Stage::D1)
            .with_score(Stage::D1, 100.0)
            .with_score(Stage::D3, 100.0)
            .with_score(Stage::D7, 100.0);

        let result = AdvancementEngine::evaluate(&item, date("2025-05-01"));
        assert!(matches!(
            result,
            Advancement::Advanced { to: Stage::D3, .. }
        ));
    }

    #[test]
    fn saturates_at_calendar_end() {
        let item = ReviewItem::new("p1")
            .with_score(Stage::D1, 80.0)
            .with_anchor(NaiveDate::MAX);

        let result = AdvancementEngine::evaluate(&item, date("2025-05-01"));
        let updates = result.updates().expect("advanced");
        assert_eq!(updates.next_review, Some(NaiveDate::MAX));
    }
}
