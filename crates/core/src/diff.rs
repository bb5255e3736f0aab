//! Structural field diff used to describe entity updates on the timeline.
//!
//! Entities are compared through their serialized JSON form over an explicit
//! list of tracked fields, so the same function serves leads, students,
//! applications, and tasks. Bookkeeping columns (`id`, `updated_at`, ...) are
//! simply left out of the tracked list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// A field that participates in update diffs, with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedField {
    pub key: &'static str,
    pub label: &'static str,
}

/// Shorthand constructor for tracked-field tables.
pub const fn tracked(key: &'static str, label: &'static str) -> TrackedField {
    TrackedField { key, label }
}

/// One changed field between two versions of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub label: String,
    pub old: Value,
    pub new: Value,
}

impl FieldChange {
    /// Human-readable form, e.g. `"Status: New → Contacted"`.
    pub fn describe(&self) -> String {
        format!(
            "{}: {} → {}",
            self.label,
            render_value(&self.old),
            render_value(&self.new)
        )
    }
}

/// Render a JSON value for display. Missing and null values show as `(empty)`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "(empty)".to_string(),
        Value::String(s) if s.is_empty() => "(empty)".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compare two JSON objects over the tracked fields.
///
/// A key absent from one side is treated as `null`. Changes are returned in
/// the order of `fields`.
pub fn diff_values(old: &Value, new: &Value, fields: &[TrackedField]) -> Vec<FieldChange> {
    fields
        .iter()
        .filter_map(|f| {
            let before = old.get(f.key).cloned().unwrap_or(Value::Null);
            let after = new.get(f.key).cloned().unwrap_or(Value::Null);
            (before != after).then(|| FieldChange {
                field: f.key.to_string(),
                label: f.label.to_string(),
                old: before,
                new: after,
            })
        })
        .collect()
}

/// Serialize both versions and diff them over the tracked fields.
pub fn diff_serialized<T: Serialize>(
    old: &T,
    new: &T,
    fields: &[TrackedField],
) -> Result<Vec<FieldChange>, CoreError> {
    let before = serde_json::to_value(old)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize entity: {e}")))?;
    let after = serde_json::to_value(new)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize entity: {e}")))?;
    Ok(diff_values(&before, &after, fields))
}

/// Join change descriptions into one line for the event description.
pub fn describe_changes(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(FieldChange::describe)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whether the given field is among the changes.
pub fn has_change(changes: &[FieldChange], field: &str) -> bool {
    changes.iter().any(|c| c.field == field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[TrackedField] = &[
        tracked("status", "Status"),
        tracked("email", "Email"),
        tracked("phone", "Phone"),
    ];

    #[test]
    fn reports_changed_fields_in_tracked_order() {
        let old = json!({"status": "New", "email": "a@x.com", "phone": null});
        let new = json!({"status": "Contacted", "email": "a@x.com", "phone": "555"});

        let changes = diff_values(&old, &new, FIELDS);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "status");
        assert_eq!(changes[1].field, "phone");
        assert_eq!(
            describe_changes(&changes),
            "Status: New → Contacted; Phone: (empty) → 555"
        );
    }

    #[test]
    fn untracked_fields_are_ignored() {
        let old = json!({"status": "New", "updated_at": "2026-01-01T00:00:00Z"});
        let new = json!({"status": "New", "updated_at": "2026-02-01T00:00:00Z"});
        assert!(diff_values(&old, &new, FIELDS).is_empty());
    }

    #[test]
    fn missing_key_counts_as_null() {
        let old = json!({});
        let new = json!({"email": null});
        assert!(diff_values(&old, &new, FIELDS).is_empty());
    }

    #[test]
    fn non_string_values_render_as_json() {
        let change = FieldChange {
            field: "gpa".into(),
            label: "GPA".into(),
            old: json!(3.5),
            new: json!(3.75),
        };
        assert_eq!(change.describe(), "GPA: 3.5 → 3.75");
    }

    #[test]
    fn diff_serialized_works_on_structs() {
        #[derive(Serialize)]
        struct Row {
            status: &'static str,
            email: Option<&'static str>,
        }
        let changes = diff_serialized(
            &Row { status: "New", email: None },
            &Row { status: "Lost", email: None },
            FIELDS,
        )
        .unwrap();
        assert!(has_change(&changes, "status"));
        assert!(!has_change(&changes, "email"));
    }
}
