//! # Property-Based Tests
//!
//! Determinism and schedule invariants of the advancement engine, checked
//! with proptest.

use chrono::NaiveDate;
use proptest::prelude::*;
use sixmin_core::{
    Advancement, AdvancementEngine, ReviewItem, Stage, THRESHOLD, add_calendar_days, next_stage,
    rule_for,
};

fn any_stage() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    // 1990-01-01 .. roughly 2090
    (0u32..36_500).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1990, 1, 1)
            .and_then(|d| add_calendar_days(d, offset).ok())
            .expect("in range")
    })
}

fn any_item() -> impl Strategy<Value = ReviewItem> {
    (
        prop::option::of(any_stage()),
        prop::collection::vec(0.0f64..=100.0, 5),
        prop::option::of(any_date()),
    )
        .prop_map(|(stage, scores, anchor)| {
            let mut item = ReviewItem::new("prop");
            item.stage = stage;
            item.anchor_date = anchor;
            for (s, score) in Stage::ALL.into_iter().zip(scores) {
                item = item.with_score(s, score);
            }
            item
        })
}

proptest! {
    /// Same snapshot and same day produce the same result.
    #[test]
    fn evaluation_is_deterministic(item in any_item(), today in any_date()) {
        let first = AdvancementEngine::evaluate(&item, today);
        let second = AdvancementEngine::evaluate(&item, today);
        prop_assert_eq!(first, second);
    }

    /// An unset stage behaves exactly like an explicit D1.
    #[test]
    fn unset_stage_equals_d1(item in any_item(), today in any_date()) {
        let mut unset = item.clone();
        unset.stage = None;
        let mut d1 = item;
        d1.stage = Some(Stage::D1);

        prop_assert_eq!(
            AdvancementEngine::evaluate(&unset, today),
            AdvancementEngine::evaluate(&d1, today)
        );
    }

    /// Advancement happens exactly when the current stage's score meets the threshold.
    #[test]
    fn advances_iff_score_meets_threshold(item in any_item(), today in any_date()) {
        let stage = item.stage.unwrap_or(Stage::D1);
        let result = AdvancementEngine::evaluate(&item, today);

        match rule_for(stage) {
            None => prop_assert!(!result.is_advanced()),
            Some(rule) => {
                let expected = item.score(rule.score_field) >= THRESHOLD;
                prop_assert_eq!(result.is_advanced(), expected);
            }
        }
    }

    /// An advancement always moves exactly one stage forward.
    #[test]
    fn advancement_moves_one_stage(item in any_item(), today in any_date()) {
        if let Advancement::Advanced { from, to, updates, .. } = AdvancementEngine::evaluate(&item, today) {
            prop_assert_eq!(to, next_stage(from));
            prop_assert_eq!(updates.stage, to);
            prop_assert_eq!(updates.last_reviewed, today);
            prop_assert_eq!(updates.next_review.is_none(), to.is_terminal());
        }
    }

    /// Applying the same updates twice yields the same record as applying once.
    #[test]
    fn applying_updates_is_idempotent(item in any_item(), today in any_date()) {
        if let Some(updates) = AdvancementEngine::evaluate(&item, today).updates() {
            let mut once = item.clone();
            updates.apply_to(&mut once);
            let mut twice = once.clone();
            updates.apply_to(&mut twice);
            prop_assert_eq!(once, twice);
        }
    }

    /// Adding days composes: (d + a) + b == d + (a + b).
    #[test]
    fn calendar_addition_composes(d in any_date(), a in 0u32..400, b in 0u32..400) {
        let stepwise = add_calendar_days(add_calendar_days(d, a).expect("a"), b).expect("b");
        let direct = add_calendar_days(d, a + b).expect("a+b");
        prop_assert_eq!(stepwise, direct);
    }

    /// Zero days is the identity.
    #[test]
    fn calendar_zero_is_identity(d in any_date()) {
        prop_assert_eq!(add_calendar_days(d, 0).expect("zero"), d);
    }

    /// Ordinal distance equals the number of days added.
    #[test]
    fn calendar_distance_matches(d in any_date(), n in 0u32..10_000) {
        let later = add_calendar_days(d, n).expect("add");
        prop_assert_eq!((later - d).num_days(), i64::from(n));
    }
}
