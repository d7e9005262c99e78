//! # Record Store Module
//!
//! The seam between the driver and wherever review items live.
//!
//! ## Backends
//!
//! - [`NotionStore`] - a Notion database over the REST API
//! - [`FileStore`] - a local JSON snapshot file (offline runs, fixtures)
//!
//! Both speak in core types: they hand out [`ReviewItem`] snapshots and accept
//! [`FieldUpdates`]. Translating to the backend's wire representation, and
//! skipping fields that cannot be written, is the backend's job.

pub mod codec;
mod file;
mod notion;
mod schema;

pub use file::FileStore;
pub use notion::{NOTION_VERSION, NotionStore};
pub use schema::{FieldKind, StoreSchema, TargetFieldKind};

use crate::SixminError;
use sixmin_core::{FieldUpdates, ItemId, ReviewItem, Stage};

/// Which items a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Items whose stage is not `Done`.
    Pending,
    /// Every item.
    All,
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPage {
    pub items: Vec<ReviewItem>,
    /// Cursor for the following page, `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Read and write access to review items.
pub trait RecordStore: Send + Sync {
    /// Describe the store's fields and resolve the target field kind.
    fn describe_schema(&self) -> impl Future<Output = Result<StoreSchema, SixminError>> + Send;

    /// Fetch one page of items. Pass the previous page's `next_cursor` to
    /// continue.
    fn fetch_items(
        &self,
        scope: Scope,
        cursor: Option<String>,
    ) -> impl Future<Output = Result<ItemPage, SixminError>> + Send;

    /// Write an advancement's field updates to one item.
    fn apply_updates(
        &self,
        id: &ItemId,
        updates: &FieldUpdates,
        target: TargetFieldKind,
    ) -> impl Future<Output = Result<(), SixminError>> + Send;

    /// Overwrite one item's review target label.
    fn write_target_label(
        &self,
        id: &ItemId,
        label: &str,
        target: TargetFieldKind,
    ) -> impl Future<Output = Result<(), SixminError>> + Send;

    /// Set the score recorded for `stage` on one item.
    fn write_score(
        &self,
        id: &ItemId,
        stage: Stage,
        score: f64,
    ) -> impl Future<Output = Result<(), SixminError>> + Send;
}
