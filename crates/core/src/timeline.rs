//! Timeline event types, titles, and validation for manual entries.

use crate::entity::EntityKind;
use crate::error::CoreError;

/// Event types emitted by the entity services.
pub mod event_types {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const DELETED: &str = "deleted";
    pub const CONVERTED: &str = "converted";
    pub const TASK_CREATED: &str = "task_created";
    pub const TASK_UPDATED: &str = "task_updated";
    pub const TASK_COMPLETED: &str = "task_completed";
    pub const TASK_DELETED: &str = "task_deleted";
}

/// Maximum length of an event type name.
pub const MAX_EVENT_TYPE_LENGTH: usize = 50;

/// Maximum length of an event title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Validate a manual event type: non-empty lowercase `snake_case`.
pub fn validate_event_type(event_type: &str) -> Result<(), CoreError> {
    if event_type.is_empty() || event_type.len() > MAX_EVENT_TYPE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Event type must be 1-{MAX_EVENT_TYPE_LENGTH} characters"
        )));
    }
    let valid_chars = event_type
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    let starts_with_letter = event_type.as_bytes()[0].is_ascii_lowercase();
    if !valid_chars || !starts_with_letter {
        return Err(CoreError::Validation(format!(
            "Invalid event type '{event_type}'. Use lowercase snake_case"
        )));
    }
    Ok(())
}

/// Validate an event title: non-blank and within the length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Event title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Event title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Title for a `created` event, e.g. `"Lead LEAD-0001 created"`.
pub fn created_title(kind: EntityKind, code: &str) -> String {
    format!("{kind} {code} created")
}

/// Title for an `updated` / `status_changed` event.
pub fn updated_title(kind: EntityKind, code: &str) -> String {
    format!("{kind} {code} updated")
}

/// Title for a `deleted` event.
pub fn deleted_title(kind: EntityKind, code: &str) -> String {
    format!("{kind} {code} deleted")
}
