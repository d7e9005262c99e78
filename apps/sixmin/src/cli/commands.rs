//! # CLI Command Implementations
//!
//! Each command prints either human-readable text or, with `--json-mode`, one
//! pretty-printed JSON document on stdout. Logs go to stderr.

use crate::SixminError;
use crate::driver::Driver;
use crate::store::RecordStore;
use chrono::NaiveDate;
use serde::Serialize;
use sixmin_core::{
    Advancement, AdvancementEngine, ItemId, ReviewItem, Stage, THRESHOLD, format_iso_date,
    label_for, rules,
};

fn print_json<T: Serialize>(value: &T) -> Result<(), SixminError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// ADVANCE COMMAND
// =============================================================================

/// Advance every pending item. Fails the run if any item errored.
pub async fn cmd_advance<S: RecordStore>(
    driver: &Driver<S>,
    json_mode: bool,
) -> Result<bool, SixminError> {
    tracing::info!("Starting score-based advancement scan...");
    let summary = driver.advance_all().await?;

    if json_mode {
        print_json(&summary)?;
        return Ok(summary.is_success());
    }

    println!("sixmin Advancement Summary");
    println!("==========================");
    if summary.dry_run {
        println!("(dry run - nothing was written)");
    }
    println!("Total pages checked: {}", summary.total);
    println!("Pages advanced:      {}", summary.advanced);
    println!("Pages skipped:       {}", summary.skipped);
    println!("Errors:              {}", summary.errored);

    if !summary.transitions.is_empty() {
        println!();
        for t in &summary.transitions {
            println!("  {}  {} -> {}", t.id, t.from, t.to);
        }
    }

    if summary.is_success() {
        tracing::info!("Score-based advancement completed successfully");
    } else {
        println!();
        for failure in &summary.errors {
            println!(
                "  ERROR {} ({}): {}",
                failure.id,
                failure.title.as_deref().unwrap_or("untitled"),
                failure.message
            );
        }
        tracing::warn!("Some errors occurred. Check the logs above for details.");
    }

    Ok(summary.is_success())
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Evaluate one ad-hoc item. Never touches a store.
pub fn cmd_evaluate(
    stage: Stage,
    score: f64,
    anchor: Option<NaiveDate>,
    today: NaiveDate,
    json_mode: bool,
) -> Result<bool, SixminError> {
    let mut item = ReviewItem::new("evaluate")
        .with_stage(stage)
        .with_score(stage, score);
    item.anchor_date = anchor;

    let result = AdvancementEngine::evaluate(&item, today);

    if json_mode {
        print_json(&result)?;
        return Ok(true);
    }

    match &result {
        Advancement::Skipped { reason } => {
            println!("Skipped: {}", reason);
        }
        Advancement::Advanced {
            from,
            to,
            score,
            updates,
        } => {
            println!("Advanced: {} -> {} (score: {})", from, to, score);
            println!("  Status:        {}", updates.status);
            println!("  Review target: {}", updates.target_label);
            println!("  Last reviewed: {}", format_iso_date(updates.last_reviewed));
            match updates.next_review {
                Some(date) => println!("  Next review:   {}", format_iso_date(date)),
                None => println!("  Next review:   (cleared)"),
            }
        }
    }

    Ok(true)
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Check the store schema. Violations are reported, not raised.
pub async fn cmd_validate<S: RecordStore>(
    driver: &Driver<S>,
    json_mode: bool,
) -> Result<bool, SixminError> {
    let (target, violations) = match driver.validate_schema().await {
        Ok(schema) => (Some(schema.target()), Vec::new()),
        Err(SixminError::Schema(violations)) => (None, violations),
        Err(e) => return Err(e),
    };

    if json_mode {
        let output = serde_json::json!({
            "valid": violations.is_empty(),
            "target_kind": target.map(|t| format!("{:?}", t)),
            "violations": violations,
        });
        print_json(&output)?;
        return Ok(violations.is_empty());
    }

    if violations.is_empty() {
        println!("Database schema validation passed");
        if let Some(t) = target {
            println!("Review target field: {:?}", t);
        }
    } else {
        println!("Database schema validation failed:");
        for v in &violations {
            println!("  - {}", v);
        }
    }

    Ok(violations.is_empty())
}

// =============================================================================
// REPAIR COMMAND
// =============================================================================

/// Rewrite stale review target labels.
pub async fn cmd_repair<S: RecordStore>(
    driver: &Driver<S>,
    json_mode: bool,
) -> Result<bool, SixminError> {
    let summary = driver.repair_labels().await?;

    if json_mode {
        print_json(&summary)?;
        return Ok(summary.is_success());
    }

    println!("sixmin Label Repair");
    println!("===================");
    if summary.dry_run {
        println!("(dry run - nothing was written)");
    }
    println!("Total pages checked: {}", summary.total);
    println!("Labels fixed:        {}", summary.fixed);
    println!("Already correct:     {}", summary.unchanged);
    println!("Skipped:             {}", summary.skipped);
    println!("Errors:              {}", summary.errored);

    Ok(summary.is_success())
}

// =============================================================================
// SET-SCORE COMMAND
// =============================================================================

/// Record one score on one item.
pub async fn cmd_set_score<S: RecordStore>(
    driver: &Driver<S>,
    id: &ItemId,
    stage: Stage,
    value: f64,
    json_mode: bool,
) -> Result<bool, SixminError> {
    driver.set_score(id, stage, value).await?;

    if json_mode {
        let output = serde_json::json!({
            "id": id,
            "stage": stage,
            "value": value,
            "dry_run": driver.options().dry_run,
        });
        print_json(&output)?;
    } else {
        println!("Set {} score of {} to {}", stage, id, value);
    }

    Ok(true)
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// Print the stage table.
pub fn cmd_stages(json_mode: bool) -> Result<bool, SixminError> {
    if json_mode {
        let output = serde_json::json!({
            "threshold": THRESHOLD,
            "stages": rules(),
            "terminal": {
                "stage": Stage::Done,
                "target_label": label_for(Stage::Done),
            },
        });
        print_json(&output)?;
        return Ok(true);
    }

    println!("Advancement threshold: {}", THRESHOLD);
    println!();
    println!("{:<6} {:<10} {:<6} {:>8}  Label", "Stage", "Score", "Next", "Interval");
    for rule in rules() {
        println!(
            "{:<6} {:<10} {:<6} {:>7}d  {}",
            rule.stage.name(),
            rule.score_field,
            rule.next.name(),
            rule.interval_days,
            label_for(rule.stage)
        );
    }
    println!(
        "{:<6} {:<10} {:<6} {:>8}  {}",
        Stage::Done.name(),
        "-",
        "-",
        "-",
        label_for(Stage::Done)
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn unserializable_output_is_an_error() {
        // JSON object keys must be strings.
        let mut by_pair = BTreeMap::new();
        by_pair.insert((1u8, 2u8), "x");
        assert!(matches!(print_json(&by_pair), Err(SixminError::Json(_))));
    }

    #[test]
    fn stage_table_prints() {
        assert!(matches!(cmd_stages(true), Ok(true)));
        assert!(matches!(cmd_stages(false), Ok(true)));
    }
}
