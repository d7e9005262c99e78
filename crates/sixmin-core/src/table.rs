//! # Stage Table
//!
//! The review schedule as a fixed lookup table.
//!
//! | Stage | Score field | Next | Interval | Label |
//! |-------|-------------|------|----------|-------|
//! | D1  | `D1 Score`  | D3   | 2 days  | 能理解 |
//! | D3  | `D3 Score`  | D7   | 4 days  | 能表达 |
//! | D7  | `D7 Score`  | D14  | 7 days  | 语法对 |
//! | D14 | `D14 Score` | D30  | 16 days | 能沟通 |
//! | D30 | `D30 Score` | Done | 0 days  | 熟练掌握 |
//! | Done | -          | Done | -       | 已完成 |
//!
//! The interval belongs to the stage being left: finishing D1 schedules the
//! D3 review two days out. The label is the one shown while an item sits in
//! a stage, which is also the one written when the item enters it.

use crate::Stage;
use serde::Serialize;

/// Advancement rule for one non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageRule {
    /// Stage this rule applies to.
    pub stage: Stage,
    /// Name of the score field read while in `stage`.
    pub score_field: &'static str,
    /// Stage entered on success.
    pub next: Stage,
    /// Days added to the anchor date to get the next review date.
    pub interval_days: u32,
    /// Label written when entering `next`.
    pub target_label: &'static str,
}

/// Display label per stage, indexed by [`Stage::index`].
const STAGE_LABELS: [&str; 6] = ["能理解", "能表达", "语法对", "能沟通", "熟练掌握", "已完成"];

/// One rule per non-terminal stage, indexed by [`Stage::index`].
const STAGE_TABLE: [StageRule; 5] = [
    StageRule {
        stage: Stage::D1,
        score_field: "D1 Score",
        next: Stage::D3,
        interval_days: 2,
        target_label: STAGE_LABELS[Stage::D3.index()],
    },
    StageRule {
        stage: Stage::D3,
        score_field: "D3 Score",
        next: Stage::D7,
        interval_days: 4,
        target_label: STAGE_LABELS[Stage::D7.index()],
    },
    StageRule {
        stage: Stage::D7,
        score_field: "D7 Score",
        next: Stage::D14,
        interval_days: 7,
        target_label: STAGE_LABELS[Stage::D14.index()],
    },
    StageRule {
        stage: Stage::D14,
        score_field: "D14 Score",
        next: Stage::D30,
        interval_days: 16,
        target_label: STAGE_LABELS[Stage::D30.index()],
    },
    StageRule {
        stage: Stage::D30,
        score_field: "D30 Score",
        next: Stage::Done,
        interval_days: 0,
        target_label: STAGE_LABELS[Stage::Done.index()],
    },
];

/// All rules in schedule order.
#[must_use]
pub fn rules() -> &'static [StageRule] {
    &STAGE_TABLE
}

/// Rule for `stage`, or `None` for the terminal stage.
#[must_use]
pub fn rule_for(stage: Stage) -> Option<&'static StageRule> {
    STAGE_TABLE.get(stage.index())
}

/// Stage immediately after `stage`. `Done` maps to itself.
#[must_use]
pub fn next_stage(stage: Stage) -> Stage {
    rule_for(stage).map(|r| r.next).unwrap_or(Stage::Done)
}

/// Fixed display text for `stage`.
#[must_use]
pub fn label_for(stage: Stage) -> &'static str {
    STAGE_LABELS[stage.index()]
}

/// Score field read while in `stage`.
#[must_use]
pub fn score_field_for(stage: Stage) -> Option<&'static str> {
    rule_for(stage).map(|r| r.score_field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_rule_per_non_terminal_stage() {
        let covered: Vec<Stage> = rules().iter().map(|r| r.stage).collect();
        let expected: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|s| !s.is_terminal())
            .collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn rule_index_matches_stage() {
        for stage in Stage::ALL {
            match rule_for(stage) {
                Some(rule) => assert_eq!(rule.stage, stage),
                None => assert!(stage.is_terminal()),
            }
        }
    }

    #[test]
    fn next_stage_is_successor_in_order() {
        for pair in Stage::ALL.windows(2) {
            assert_eq!(next_stage(pair[0]), pair[1]);
        }
        assert_eq!(next_stage(Stage::Done), Stage::Done);
    }

    #[test]
    fn rule_label_is_label_of_entered_stage() {
        for rule in rules() {
            assert_eq!(rule.target_label, label_for(rule.next));
        }
    }

    #[test]
    fn canonical_intervals() {
        let intervals: Vec<u32> = rules().iter().map(|r| r.interval_days).collect();
        assert_eq!(intervals, vec![2, 4, 7, 16, 0]);
    }

    #[test]
    fn score_fields_are_distinct() {
        let mut fields: Vec<&str> = rules().iter().map(|r| r.score_field).collect();
        fields.sort_unstable();
        fields.dedup();
        assert_eq!(fields.len(), rules().len());
        assert_eq!(score_field_for(Stage::Done), None);
    }

    #[test]
    fn terminal_label() {
        assert_eq!(label_for(Stage::Done), "已完成");
        assert_eq!(label_for(Stage::D1), "能理解");
    }
}
