//! Notion JSON fixtures through the property codec.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use serde_json::{Value, json};
use sixmin::config::{AnchorPolicy, FieldNames};
use sixmin::store::TargetFieldKind;
use sixmin::store::codec::{decode_page, decode_query, decode_schema, encode_updates};
use sixmin_core::{AdvancementEngine, FieldUpdates, ReviewItem, Stage, Status};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn page_fixture() -> Value {
    json!({
        "object": "page",
        "id": "262e666e-cf2c-81be-b501-ee168d3cfb90",
        "properties": {
            "Name": {
                "type": "title",
                "title": [{ "type": "text", "text": { "content": "你好" }, "plain_text": "你好" }]
            },
            "Date": { "type": "date", "date": { "start": "2025-08-30", "end": null } },
            "Review Stage": { "type": "select", "select": { "name": "D3", "color": "blue" } },
            "Status": { "type": "select", "select": { "name": "Reviewing" } },
            "Review Target": {
                "type": "rich_text",
                "rich_text": [{ "type": "text", "text": { "content": "能表达" }, "plain_text": "能表达" }]
            },
            "Last Review Date": {
                "type": "date",
                "date": { "start": "2025-08-30T21:15:00.000+08:00" }
            },
            "Next Review Date": { "type": "date", "date": { "start": "2025-09-03" } },
            "D1 Score": { "type": "number", "number": 82 },
            "D3 Score": { "type": "number", "number": 71.5 },
            "D7 Score": { "type": "number", "number": null }
        }
    })
}

fn advanced_updates(stage: Stage, score: f64) -> FieldUpdates {
    let item = ReviewItem::new("x").with_stage(stage).with_score(stage, score);
    AdvancementEngine::evaluate(&item, date(2025, 9, 1))
        .updates()
        .cloned()
        .unwrap()
}

// =============================================================================
// DECODING
// =============================================================================

#[test]
fn decodes_full_page() {
    let item = decode_page(&page_fixture(), &FieldNames::default(), AnchorPolicy::Today).unwrap();

    assert_eq!(item.id.as_str(), "262e666e-cf2c-81be-b501-ee168d3cfb90");
    assert_eq!(item.title.as_deref(), Some("你好"));
    assert_eq!(item.stage, Some(Stage::D3));
    assert_eq!(item.unrecognized_stage, None);
    assert_eq!(item.status, Some(Status::Reviewing));
    assert_eq!(item.target_label.as_deref(), Some("能表达"));
    assert_eq!(item.last_reviewed, Some(date(2025, 8, 30)));
    assert_eq!(item.next_review, Some(date(2025, 9, 3)));
    assert_eq!(item.score("D1 Score"), 82.0);
    assert_eq!(item.score("D3 Score"), 71.5);
    assert!(!item.scores.contains_key("D7 Score"));
    // Anchor stays unset unless the item-date policy is chosen.
    assert_eq!(item.anchor_date, None);
}

#[test]
fn item_date_policy_reads_anchor() {
    let item = decode_page(
        &page_fixture(),
        &FieldNames::default(),
        AnchorPolicy::ItemDate,
    )
    .unwrap();
    assert_eq!(item.anchor_date, Some(date(2025, 8, 30)));

    // D3 score 71.5 passes; the interval counts from the item's own date.
    let result = AdvancementEngine::evaluate(&item, date(2025, 9, 1));
    let updates = result.updates().unwrap();
    assert_eq!(updates.stage, Stage::D7);
    assert_eq!(updates.next_review, Some(date(2025, 9, 3)));
    assert_eq!(updates.last_reviewed, date(2025, 9, 1));
}

#[test]
fn unknown_stage_reads_as_d1() {
    let mut page = page_fixture();
    page["properties"]["Review Stage"]["select"]["name"] = json!("D2");
    let item = decode_page(&page, &FieldNames::default(), AnchorPolicy::Today).unwrap();
    assert_eq!(item.stage, Some(Stage::D1));
    assert_eq!(item.unrecognized_stage.as_deref(), Some("D2"));
}

#[test]
fn empty_page_decodes_as_uninitialized_item() {
    let page = json!({ "id": "p1", "properties": { "Review Stage": { "type": "select", "select": null } } });
    let item = decode_page(&page, &FieldNames::default(), AnchorPolicy::Today).unwrap();
    assert_eq!(item.stage, None);
    assert_eq!(item.title, None);
    assert!(item.scores.is_empty());
    assert_eq!(item.display_name(), "p1");
}

#[test]
fn formula_target_label_is_read() {
    let mut page = page_fixture();
    page["properties"]["Review Target"] =
        json!({ "type": "formula", "formula": { "type": "string", "string": "语法对" } });
    let item = decode_page(&page, &FieldNames::default(), AnchorPolicy::Today).unwrap();
    assert_eq!(item.target_label.as_deref(), Some("语法对"));
}

#[test]
fn page_without_id_is_rejected() {
    let result = decode_page(&json!({ "properties": {} }), &FieldNames::default(), AnchorPolicy::Today);
    assert!(result.is_err());
}

#[test]
fn query_response_cursor() {
    let fields = FieldNames::default();
    let more = json!({
        "object": "list",
        "results": [page_fixture(), { "object": "page" }],
        "has_more": true,
        "next_cursor": "cursor-2"
    });
    let page = decode_query(&more, &fields, AnchorPolicy::Today).unwrap();
    // The id-less result is dropped, not fatal.
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));

    let last = json!({ "results": [], "has_more": false, "next_cursor": null });
    let page = decode_query(&last, &fields, AnchorPolicy::Today).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);

    assert!(decode_query(&json!({ "object": "error" }), &fields, AnchorPolicy::Today).is_err());
}

#[test]
fn database_schema_fixture() {
    let db = json!({
        "object": "database",
        "properties": {
            "Name": { "type": "title", "title": {} },
            "Date": { "type": "date", "date": {} },
            "Review Stage": { "type": "select", "select": { "options": [] } },
            "Status": { "type": "select", "select": { "options": [] } },
            "Review Target": { "type": "formula", "formula": { "expression": "" } },
            "Last Review Date": { "type": "date", "date": {} },
            "Next Review Date": { "type": "date", "date": {} },
            "D1 Score": { "type": "number", "number": {} },
            "D3 Score": { "type": "number", "number": {} },
            "D7 Score": { "type": "number", "number": {} },
            "D14 Score": { "type": "number", "number": {} },
            "D30 Score": { "type": "rich_text", "rich_text": {} }
        }
    });
    let schema = decode_schema(&db, &FieldNames::default()).unwrap();
    assert_eq!(schema.target(), TargetFieldKind::Computed);
    assert_eq!(
        schema.violations(),
        &["Property \"D30 Score\" must be number, got rich_text".to_string()]
    );
}

// =============================================================================
// ENCODING
// =============================================================================

#[test]
fn encodes_advance_as_select_target() {
    let props = encode_updates(
        &advanced_updates(Stage::D1, 79.0),
        TargetFieldKind::Choice,
        &FieldNames::default(),
    );
    assert_eq!(
        props,
        json!({
            "Review Stage": { "select": { "name": "D3" } },
            "Status": { "select": { "name": "Reviewing" } },
            "Last Review Date": { "date": { "start": "2025-09-01" } },
            "Next Review Date": { "date": { "start": "2025-09-03" } },
            "Review Target": { "select": { "name": "能表达" } }
        })
    );
}

#[test]
fn encodes_terminal_advance_with_cleared_date() {
    let props = encode_updates(
        &advanced_updates(Stage::D30, 90.0),
        TargetFieldKind::FreeText,
        &FieldNames::default(),
    );
    assert_eq!(props["Review Stage"], json!({ "select": { "name": "Done" } }));
    assert_eq!(props["Status"], json!({ "select": { "name": "Done" } }));
    assert_eq!(props["Next Review Date"], json!({ "date": null }));
    assert_eq!(
        props["Review Target"],
        json!({ "rich_text": [{ "text": { "content": "已完成" } }] })
    );
}

#[test]
fn computed_target_is_left_out() {
    let props = encode_updates(
        &advanced_updates(Stage::D7, 70.0),
        TargetFieldKind::Computed,
        &FieldNames::default(),
    );
    let obj = props.as_object().unwrap();
    assert_eq!(obj.len(), 4);
    assert!(!obj.contains_key("Review Target"));
}

#[test]
fn custom_field_names_are_used() {
    let fields = FieldNames {
        stage: "Stage".to_string(),
        target: "Goal".to_string(),
        ..FieldNames::default()
    };
    let props = encode_updates(
        &advanced_updates(Stage::D3, 88.0),
        TargetFieldKind::Choice,
        &fields,
    );
    assert_eq!(props["Stage"], json!({ "select": { "name": "D7" } }));
    assert_eq!(props["Goal"], json!({ "select": { "name": "语法对" } }));
    assert!(props.get("Review Stage").is_none());
}
