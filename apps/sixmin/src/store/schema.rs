//! # Store Schema
//!
//! What the record store declares about its fields, resolved once per run.
//!
//! The review target field may be a choice list, free text, or a computed
//! (formula) field. Its kind is captured as [`TargetFieldKind`] when the
//! schema is described, and writers branch on that tag instead of inspecting
//! each record.

use crate::SixminError;
use crate::config::FieldNames;
use sixmin_core::rules;
use std::collections::BTreeMap;

// =============================================================================
// FIELD KIND
// =============================================================================

/// Declared type of a store field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    RichText,
    Number,
    Select,
    Date,
    Formula,
    Other(String),
}

impl FieldKind {
    /// Map a store type name (`"select"`, `"rich_text"`, ...) to a kind.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "title" => FieldKind::Title,
            "rich_text" => FieldKind::RichText,
            "number" => FieldKind::Number,
            "select" => FieldKind::Select,
            "date" => FieldKind::Date,
            "formula" => FieldKind::Formula,
            other => FieldKind::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Title => "title",
            FieldKind::RichText => "rich_text",
            FieldKind::Number => "number",
            FieldKind::Select => "select",
            FieldKind::Date => "date",
            FieldKind::Formula => "formula",
            FieldKind::Other(name) => name,
        }
    }
}

// =============================================================================
// TARGET FIELD KIND
// =============================================================================

/// How the review target label can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFieldKind {
    /// A single-choice list: written as a choice name.
    Choice,
    /// Free text: written as plain text content.
    FreeText,
    /// Derived by the store itself: never written.
    Computed,
}

impl TargetFieldKind {
    /// Resolve from the declared kind. Missing or unrecognized kinds are
    /// treated as a choice list.
    #[must_use]
    pub fn from_field_kind(kind: Option<&FieldKind>) -> Self {
        match kind {
            Some(FieldKind::RichText) => TargetFieldKind::FreeText,
            Some(FieldKind::Formula) => TargetFieldKind::Computed,
            _ => TargetFieldKind::Choice,
        }
    }

    #[must_use]
    pub fn is_writable(self) -> bool {
        !matches!(self, TargetFieldKind::Computed)
    }
}

// =============================================================================
// STORE SCHEMA
// =============================================================================

/// Declared fields of the store, checked against what the driver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSchema {
    target: TargetFieldKind,
    violations: Vec<String>,
}

impl StoreSchema {
    /// Resolve the target kind and collect every field that is missing or of
    /// the wrong kind.
    #[must_use]
    pub fn resolve(properties: BTreeMap<String, FieldKind>, fields: &FieldNames) -> Self {
        let target = TargetFieldKind::from_field_kind(properties.get(&fields.target));

        let mut required: Vec<(&str, FieldKind)> = vec![
            (fields.next_review.as_str(), FieldKind::Date),
            (fields.stage.as_str(), FieldKind::Select),
            (fields.status.as_str(), FieldKind::Select),
            (fields.last_review.as_str(), FieldKind::Date),
            (fields.anchor.as_str(), FieldKind::Date),
        ];
        required.extend(rules().iter().map(|r| (r.score_field, FieldKind::Number)));

        let violations = required
            .into_iter()
            .filter_map(|(name, expected)| match properties.get(name) {
                None => Some(format!("Property \"{}\" not found", name)),
                Some(actual) if *actual != expected => Some(format!(
                    "Property \"{}\" must be {}, got {}",
                    name,
                    expected.type_name(),
                    actual.type_name()
                )),
                Some(_) => None,
            })
            .collect();

        Self { target, violations }
    }

    #[must_use]
    pub fn target(&self) -> TargetFieldKind {
        self.target
    }

    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Fail with every violation at once.
    pub fn validate(&self) -> Result<(), SixminError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(SixminError::Schema(self.violations.clone()))
        }
    }
}
