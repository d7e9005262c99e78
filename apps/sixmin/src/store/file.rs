//! # File Store
//!
//! [`RecordStore`] over a local JSON file holding an array of review items.
//! The file is read once at open and rewritten after every write.
//!
//! Unknown stage names read as `D1` with a warning, like the Notion store,
//! and are written back as stored until the item advances.

use crate::SixminError;
use crate::config::{AnchorPolicy, DEFAULT_PAGE_SIZE, FieldNames};
use crate::store::{FieldKind, ItemPage, RecordStore, Scope, StoreSchema, TargetFieldKind};
use serde_json::Value;
use sixmin_core::{FieldUpdates, ItemId, ReviewItem, Stage, rules, score_field_for};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Review items kept in a JSON snapshot file.
pub struct FileStore {
    path: PathBuf,
    items: Mutex<Vec<ReviewItem>>,
    target: FieldKind,
    page_size: usize,
    anchor: AnchorPolicy,
}

/// Decode one stored record, reading an unknown stage name as `D1`.
fn decode_record(mut record: Value) -> Result<ReviewItem, SixminError> {
    let mut unrecognized = None;
    if let Some(slot) = record.get_mut("stage") {
        let name = slot.as_str().map(str::to_string);
        match name {
            Some(name) if name.trim().is_empty() => *slot = Value::Null,
            Some(name) if Stage::parse(&name).is_none() => {
                *slot = Value::String(Stage::D1.name().to_string());
                unrecognized = Some(name);
            }
            _ => {}
        }
    }

    let mut item: ReviewItem = serde_json::from_value(record)?;
    if let Some(name) = &unrecognized {
        tracing::warn!(item = %item.id, stage = %name, "Unrecognized stage, treating as D1");
    }
    item.unrecognized_stage = unrecognized;
    Ok(item)
}

fn encode_record(item: &ReviewItem) -> Result<Value, SixminError> {
    let mut record = serde_json::to_value(item)?;
    if let (Some(name), Some(slot)) = (&item.unrecognized_stage, record.get_mut("stage")) {
        *slot = Value::String(name.clone());
    }
    Ok(record)
}

impl FileStore {
    /// Open an existing snapshot file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SixminError> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            SixminError::Config(format!("Cannot read store file '{}': {}", path.display(), e))
        })?;
        let records: Vec<Value> = serde_json::from_str(&text)?;
        let items = records
            .into_iter()
            .map(decode_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            path,
            items: Mutex::new(items),
            target: FieldKind::RichText,
            page_size: DEFAULT_PAGE_SIZE as usize,
            anchor: AnchorPolicy::default(),
        })
    }

    /// Declare the target label field as another kind (e.g. formula).
    #[must_use]
    pub fn with_target_kind(mut self, kind: FieldKind) -> Self {
        self.target = kind;
        self
    }

    /// Serve queries in pages of `size` items.
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Count intervals from each item's stored anchor date, or from today.
    #[must_use]
    pub fn with_anchor(mut self, policy: AnchorPolicy) -> Self {
        self.anchor = policy;
        self
    }

    /// Current contents, in file order.
    pub async fn snapshot(&self) -> Vec<ReviewItem> {
        self.items.lock().await.clone()
    }

    async fn persist(&self, items: &[ReviewItem]) -> Result<(), SixminError> {
        let records = items
            .iter()
            .map(encode_record)
            .collect::<Result<Vec<_>, _>>()?;
        let text = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }

    /// Run `edit` on the item with `id`, then rewrite the file.
    async fn modify(
        &self,
        id: &ItemId,
        edit: impl FnOnce(&mut ReviewItem) + Send,
    ) -> Result<(), SixminError> {
        let mut items = self.items.lock().await;
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| SixminError::NotFound(id.clone()))?;
        edit(item);
        self.persist(&items).await
    }
}

impl RecordStore for FileStore {
    async fn describe_schema(&self) -> Result<StoreSchema, SixminError> {
        let fields = FieldNames::default();
        let mut props = BTreeMap::new();
        props.insert(fields.title.clone(), FieldKind::Title);
        props.insert(fields.anchor.clone(), FieldKind::Date);
        props.insert(fields.stage.clone(), FieldKind::Select);
        props.insert(fields.next_review.clone(), FieldKind::Date);
        props.insert(fields.last_review.clone(), FieldKind::Date);
        props.insert(fields.status.clone(), FieldKind::Select);
        props.insert(fields.target.clone(), self.target.clone());
        for rule in rules() {
            props.insert(rule.score_field.to_string(), FieldKind::Number);
        }
        Ok(StoreSchema::resolve(props, &fields))
    }

    async fn fetch_items(
        &self,
        scope: Scope,
        cursor: Option<String>,
    ) -> Result<ItemPage, SixminError> {
        let offset = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| SixminError::Decode(format!("invalid cursor '{}'", c)))?,
            None => 0,
        };

        let items = self.items.lock().await;
        let matching: Vec<&ReviewItem> = items
            .iter()
            .filter(|item| scope == Scope::All || item.stage != Some(Stage::Done))
            .collect();

        let end = offset.saturating_add(self.page_size).min(matching.len());
        let page = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|item| {
                let mut item = (*item).clone();
                if self.anchor == AnchorPolicy::Today {
                    item.anchor_date = None;
                }
                item
            })
            .collect();
        let next_cursor = (end < matching.len()).then(|| end.to_string());

        Ok(ItemPage {
            items: page,
            next_cursor,
        })
    }

    async fn apply_updates(
        &self,
        id: &ItemId,
        updates: &FieldUpdates,
        target: TargetFieldKind,
    ) -> Result<(), SixminError> {
        self.modify(id, |item| {
            let label = item.target_label.take();
            updates.apply_to(item);
            if !target.is_writable() {
                item.target_label = label;
            }
        })
        .await
    }

    async fn write_target_label(
        &self,
        id: &ItemId,
        label: &str,
        target: TargetFieldKind,
    ) -> Result<(), SixminError> {
        if !target.is_writable() {
            return Ok(());
        }
        self.modify(id, |item| item.target_label = Some(label.to_string()))
            .await
    }

    async fn write_score(&self, id: &ItemId, stage: Stage, score: f64) -> Result<(), SixminError> {
        let field = score_field_for(stage).ok_or_else(|| {
            SixminError::Config(format!("Stage {} has no score field", stage))
        })?;
        self.modify(id, |item| {
            item.scores.insert(field.to_string(), score);
        })
        .await
    }
}
