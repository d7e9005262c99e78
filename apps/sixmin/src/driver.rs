//! # Driver
//!
//! Runs the advancement engine over a record store.
//!
//! ```text
//! describe_schema ─► validate ─► fetch pending (all pages) ─► evaluate each
//!                                                              │
//!                              apply_updates ◄── advanced ─────┤
//!                              (skipped unless dry-run)        └── skipped
//! ```
//!
//! Every item is evaluated against one snapshot taken before any write, so an
//! item advanced in this run is never seen again in the same run. A failure
//! on one item is logged and recorded in the summary; the run continues with
//! the next item.

use crate::SixminError;
use crate::store::{RecordStore, Scope, StoreSchema, TargetFieldKind};
use chrono::NaiveDate;
use serde::Serialize;
use sixmin_core::{Advancement, AdvancementEngine, ItemId, ReviewItem, Stage, label_for};

// =============================================================================
// OPTIONS
// =============================================================================

/// Per-run settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// The run day. Every evaluation in the run uses it.
    pub today: NaiveDate,
    /// Evaluate and report, but write nothing.
    pub dry_run: bool,
}

// =============================================================================
// SUMMARIES
// =============================================================================

/// One stage move made (or, in a dry run, that would be made).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub id: ItemId,
    pub from: Stage,
    pub to: Stage,
}

/// An item whose processing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub id: ItemId,
    pub title: Option<String>,
    pub message: String,
}

/// Outcome of an advancement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub advanced: usize,
    pub skipped: usize,
    pub errored: usize,
    pub transitions: Vec<Transition>,
    pub errors: Vec<ItemFailure>,
    pub dry_run: bool,
}

impl RunSummary {
    /// True when no item failed. Runs where everything was skipped succeed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errored == 0
    }
}

/// Outcome of a target-label repair pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub total: usize,
    /// Labels rewritten (or, in a dry run, that would be rewritten).
    pub fixed: usize,
    /// Labels already matching the stage.
    pub unchanged: usize,
    /// Items without a stage, or whose label field cannot be written.
    pub skipped: usize,
    pub errored: usize,
    pub errors: Vec<ItemFailure>,
    pub dry_run: bool,
}

impl RepairSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errored == 0
    }
}

fn failure(item: &ReviewItem, err: &SixminError) -> ItemFailure {
    ItemFailure {
        id: item.id.clone(),
        title: item.title.clone(),
        message: err.to_string(),
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// Advancement driver bound to one store and one run day.
pub struct Driver<S> {
    store: S,
    options: DriverOptions,
}

impl<S: RecordStore> Driver<S> {
    pub fn new(store: S, options: DriverOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> DriverOptions {
        self.options
    }

    /// Describe the store and fail with every schema violation at once.
    pub async fn validate_schema(&self) -> Result<StoreSchema, SixminError> {
        let schema = self.store.describe_schema().await?;
        schema.validate()?;
        tracing::debug!(target_kind = ?schema.target(), "Schema validated");
        Ok(schema)
    }

    /// Fetch every page of `scope`.
    pub async fn fetch_all(&self, scope: Scope) -> Result<Vec<ReviewItem>, SixminError> {
        let mut items = Vec::new();
        let mut cursor = None;
        loop {
            let page = self.store.fetch_items(scope, cursor).await?;
            items.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(items)
    }

    /// Validate the schema, then advance every pending item.
    ///
    /// Schema and query failures abort the run; item failures do not.
    pub async fn advance_all(&self) -> Result<RunSummary, SixminError> {
        let schema = self.validate_schema().await?;
        let items = self.fetch_all(Scope::Pending).await?;
        tracing::info!("Found {} pages to check", items.len());
        Ok(self.advance_items(&items, schema.target()).await)
    }

    /// Evaluate and write back a batch of snapshots.
    pub async fn advance_items(&self, items: &[ReviewItem], target: TargetFieldKind) -> RunSummary {
        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };

        for item in items {
            summary.total += 1;
            let name = item.display_name();

            let (from, to, score, updates) =
                match AdvancementEngine::evaluate(item, self.options.today) {
                    Advancement::Skipped { reason } => {
                        summary.skipped += 1;
                        tracing::debug!("SKIPPED: \"{}\" - {}", name, reason);
                        continue;
                    }
                    Advancement::Advanced {
                        from,
                        to,
                        score,
                        updates,
                    } => (from, to, score, updates),
                };

            if self.options.dry_run {
                tracing::info!(
                    "[DRY RUN] Would update \"{}\": {} -> {} (score: {})",
                    name,
                    from,
                    to,
                    score
                );
            } else if let Err(e) = self.store.apply_updates(&item.id, &updates, target).await {
                summary.errored += 1;
                tracing::error!("ERROR: \"{}\" - {}", name, e);
                summary.errors.push(failure(item, &e));
                continue;
            } else {
                tracing::info!("ADVANCED: \"{}\" ({} -> {}, score: {})", name, from, to, score);
            }

            summary.advanced += 1;
            summary.transitions.push(Transition {
                id: item.id.clone(),
                from,
                to,
            });
        }

        log_summary(
            "Advancement",
            &[
                ("Total pages checked", summary.total),
                ("Pages advanced", summary.advanced),
                ("Pages skipped", summary.skipped),
                ("Errors", summary.errored),
            ],
        );
        summary
    }

    /// Rewrite every stale review target label to its stage's label.
    ///
    /// Items without a stage are skipped. Running it twice writes nothing the
    /// second time.
    pub async fn repair_labels(&self) -> Result<RepairSummary, SixminError> {
        let target = self.store.describe_schema().await?.target();
        let items = self.fetch_all(Scope::All).await?;

        let mut summary = RepairSummary {
            dry_run: self.options.dry_run,
            ..RepairSummary::default()
        };

        if !target.is_writable() {
            tracing::warn!("Review target is computed by the store; nothing to repair");
        }

        for item in &items {
            summary.total += 1;
            let name = item.display_name();

            let Some(stage) = item.stage else {
                summary.skipped += 1;
                tracing::debug!("Skipping \"{}\" - no review stage", name);
                continue;
            };
            if let Some(stored) = &item.unrecognized_stage {
                summary.skipped += 1;
                tracing::debug!("Skipping \"{}\" - unrecognized stage \"{}\"", name, stored);
                continue;
            }

            let expected = label_for(stage);
            if item.target_label.as_deref() == Some(expected) {
                summary.unchanged += 1;
                continue;
            }
            if !target.is_writable() {
                summary.skipped += 1;
                continue;
            }

            if self.options.dry_run {
                tracing::info!("[DRY RUN] Would fix \"{}\" ({}) to \"{}\"", name, stage, expected);
            } else if let Err(e) = self.store.write_target_label(&item.id, expected, target).await {
                summary.errored += 1;
                tracing::error!("ERROR: \"{}\" - {}", name, e);
                summary.errors.push(failure(item, &e));
                continue;
            } else {
                tracing::info!("Fixed \"{}\" ({}) to \"{}\"", name, stage, expected);
            }
            summary.fixed += 1;
        }

        log_summary(
            "Repair",
            &[
                ("Total pages checked", summary.total),
                ("Labels fixed", summary.fixed),
                ("Already correct", summary.unchanged),
                ("Skipped", summary.skipped),
                ("Errors", summary.errored),
            ],
        );
        Ok(summary)
    }

    /// Record a score for one item. Honors dry-run.
    pub async fn set_score(&self, id: &ItemId, stage: Stage, value: f64) -> Result<(), SixminError> {
        if stage.is_terminal() {
            return Err(SixminError::Config(format!(
                "Stage {} has no score field",
                stage
            )));
        }
        if !value.is_finite() {
            return Err(SixminError::Config(format!("Score must be a number, got {}", value)));
        }
        if self.options.dry_run {
            tracing::info!("[DRY RUN] Would set {} score of {} to {}", stage, id.as_str(), value);
            return Ok(());
        }
        self.store.write_score(id, stage, value).await?;
        tracing::info!("Set {} score of {} to {}", stage, id.as_str(), value);
        Ok(())
    }
}

fn log_summary(pass: &str, counts: &[(&str, usize)]) {
    tracing::info!("{} summary:", pass);
    for (label, count) in counts {
        tracing::info!("   {}: {}", label, count);
    }
}
