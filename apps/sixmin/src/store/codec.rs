//! # Notion Property Codec
//!
//! Pure translation between Notion JSON and core types. No I/O happens here,
//! so every mapping can be tested against fixture documents.
//!
//! | Logical field | Notion property type |
//! |---------------|----------------------|
//! | stage, status | `select` |
//! | scores        | `number` |
//! | dates         | `date` (`start`, date part only) |
//! | target label  | `select`, `rich_text`, or `formula` (read-only) |
//! | title         | `title` |

use crate::SixminError;
use crate::config::{AnchorPolicy, FieldNames};
use crate::store::{FieldKind, ItemPage, Scope, StoreSchema, TargetFieldKind};
use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use sixmin_core::{
    FieldUpdates, ItemId, ReviewItem, Stage, Status, format_iso_date, parse_iso_date, rules,
};
use std::collections::BTreeMap;

// =============================================================================
// DECODING
// =============================================================================

static NULL: Value = Value::Null;

/// Date part of a `date` property. Accepts full timestamps
/// (`2025-09-01T09:00:00.000+10:00`) and keeps only the calendar day.
pub fn decode_date(prop: &Value) -> Option<NaiveDate> {
    let start = prop.get("date")?.get("start")?.as_str()?;
    parse_iso_date(start.get(..10)?).ok()
}

fn select_name(prop: &Value) -> Option<&str> {
    prop.get("select")?.get("name")?.as_str()
}

fn first_text(prop: &Value, key: &str) -> Option<String> {
    let first = prop.get(key)?.as_array()?.first()?;
    first
        .get("plain_text")
        .or_else(|| first.get("text").and_then(|t| t.get("content")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Current label of the target property, whatever its declared type.
fn decode_label(prop: &Value) -> Option<String> {
    match prop.get("type").and_then(Value::as_str) {
        Some("rich_text") => first_text(prop, "rich_text"),
        Some("formula") => prop
            .get("formula")
            .and_then(|f| f.get("string"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => select_name(prop).map(str::to_string),
    }
}

/// Stage of a page, plus the stored name when it is not a known stage.
fn decode_stage(prop: &Value, page_id: &str) -> (Option<Stage>, Option<String>) {
    let Some(name) = select_name(prop) else {
        return (None, None);
    };
    match Stage::parse(name) {
        Some(stage) => (Some(stage), None),
        None => {
            tracing::warn!(page = page_id, stage = name, "Unrecognized stage, treating as D1");
            (Some(Stage::D1), Some(name.to_string()))
        }
    }
}

fn decode_status(prop: &Value) -> Option<Status> {
    match select_name(prop)? {
        "Reviewing" => Some(Status::Reviewing),
        "Done" => Some(Status::Done),
        _ => None,
    }
}

/// Decode one Notion page into a review item.
///
/// Missing properties decode as absent values; only a missing page id is an
/// error.
pub fn decode_page(
    page: &Value,
    fields: &FieldNames,
    anchor: AnchorPolicy,
) -> Result<ReviewItem, SixminError> {
    let id = page
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| SixminError::Decode("page without id".to_string()))?;

    let props = page.get("properties").unwrap_or(&NULL);
    let prop = |name: &str| props.get(name).unwrap_or(&NULL);

    let mut item = ReviewItem::new(id);
    item.title = first_text(prop(fields.title.as_str()), "title");
    (item.stage, item.unrecognized_stage) = decode_stage(prop(fields.stage.as_str()), id);
    item.status = decode_status(prop(fields.status.as_str()));
    item.target_label = decode_label(prop(fields.target.as_str()));
    item.last_reviewed = decode_date(prop(fields.last_review.as_str()));
    item.next_review = decode_date(prop(fields.next_review.as_str()));
    if anchor == AnchorPolicy::ItemDate {
        item.anchor_date = decode_date(prop(fields.anchor.as_str()));
    }

    for rule in rules() {
        if let Some(score) = prop(rule.score_field).get("number").and_then(Value::as_f64) {
            item.scores.insert(rule.score_field.to_string(), score);
        }
    }

    Ok(item)
}

/// Decode a `databases/{id}/query` response.
///
/// Pages that cannot be decoded are logged and left out.
pub fn decode_query(
    body: &Value,
    fields: &FieldNames,
    anchor: AnchorPolicy,
) -> Result<ItemPage, SixminError> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SixminError::Decode("query response without results".to_string()))?;

    let items = results
        .iter()
        .filter_map(|page| match decode_page(page, fields, anchor) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping undecodable page: {}", e);
                None
            }
        })
        .collect();

    let has_more = body.get("has_more").and_then(Value::as_bool).unwrap_or(false);
    let next_cursor = if has_more {
        body.get("next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string)
    } else {
        None
    };

    Ok(ItemPage { items, next_cursor })
}

/// Decode a `databases/{id}` response into a resolved schema.
pub fn decode_schema(db: &Value, fields: &FieldNames) -> Result<StoreSchema, SixminError> {
    let props = db
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| SixminError::Decode("database without properties".to_string()))?;

    let kinds: BTreeMap<String, FieldKind> = props
        .iter()
        .map(|(name, prop)| {
            let type_name = prop.get("type").and_then(Value::as_str).unwrap_or("");
            (name.clone(), FieldKind::from_type_name(type_name))
        })
        .collect();

    Ok(StoreSchema::resolve(kinds, fields))
}

// =============================================================================
// ENCODING
// =============================================================================

fn encode_select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

fn encode_date(date: Option<NaiveDate>) -> Value {
    match date {
        Some(d) => json!({ "date": { "start": format_iso_date(d) } }),
        None => json!({ "date": null }),
    }
}

/// Property value for a target label, or `None` when the field is computed.
#[must_use]
pub fn encode_target(label: &str, target: TargetFieldKind) -> Option<Value> {
    match target {
        TargetFieldKind::Choice => Some(encode_select(label)),
        TargetFieldKind::FreeText => {
            Some(json!({ "rich_text": [{ "text": { "content": label } }] }))
        }
        TargetFieldKind::Computed => None,
    }
}

/// Property value for a score.
#[must_use]
pub fn encode_score(score: f64) -> Value {
    json!({ "number": score })
}

/// `properties` object for a page update carrying an advancement.
#[must_use]
pub fn encode_updates(
    updates: &FieldUpdates,
    target: TargetFieldKind,
    fields: &FieldNames,
) -> Value {
    let mut props = Map::new();
    props.insert(fields.stage.clone(), encode_select(updates.stage.name()));
    props.insert(fields.status.clone(), encode_select(updates.status.name()));
    props.insert(
        fields.last_review.clone(),
        encode_date(Some(updates.last_reviewed)),
    );
    props.insert(fields.next_review.clone(), encode_date(updates.next_review));
    if let Some(value) = encode_target(updates.target_label, target) {
        props.insert(fields.target.clone(), value);
    }
    Value::Object(props)
}

/// Body of a `databases/{id}/query` request.
#[must_use]
pub fn query_body(
    scope: Scope,
    fields: &FieldNames,
    cursor: Option<&str>,
    page_size: u32,
) -> Value {
    let mut body = Map::new();
    body.insert("page_size".to_string(), json!(page_size));
    if scope == Scope::Pending {
        body.insert(
            "filter".to_string(),
            json!({
                "property": fields.stage,
                "select": { "does_not_equal": Stage::Done.name() }
            }),
        );
    }
    if let Some(c) = cursor {
        body.insert("start_cursor".to_string(), json!(c));
    }
    Value::Object(body)
}

/// Page id as used in request paths.
#[must_use]
pub fn page_path(id: &ItemId) -> String {
    format!("/v1/pages/{}", id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_date_keeps_calendar_day() {
        let prop = json!({ "type": "date", "date": { "start": "2025-09-01T09:00:00.000+10:00" } });
        assert_eq!(decode_date(&prop), NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(decode_date(&json!({ "date": null })), None);
    }

    #[test]
    fn encode_target_per_kind() {
        assert_eq!(
            encode_target("能表达", TargetFieldKind::Choice),
            Some(json!({ "select": { "name": "能表达" } }))
        );
        assert_eq!(
            encode_target("能表达", TargetFieldKind::FreeText),
            Some(json!({ "rich_text": [{ "text": { "content": "能表达" } }] }))
        );
        assert_eq!(encode_target("能表达", TargetFieldKind::Computed), None);
    }

    #[test]
    fn query_body_filters_pending_only() {
        let fields = FieldNames::default();
        let pending = query_body(Scope::Pending, &fields, Some("abc"), 100);
        assert_eq!(pending["filter"]["property"], "Review Stage");
        assert_eq!(pending["filter"]["select"]["does_not_equal"], "Done");
        assert_eq!(pending["start_cursor"], "abc");

        let all = query_body(Scope::All, &fields, None, 50);
        assert!(all.get("filter").is_none());
        assert!(all.get("start_cursor").is_none());
        assert_eq!(all["page_size"], 50);
    }

    #[test]
    fn page_path_uses_id() {
        assert_eq!(page_path(&ItemId::new("abc-123")), "/v1/pages/abc-123");
    }
}
