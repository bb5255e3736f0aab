//! Timeline event model, the event builders used by repositories, and the
//! manual-entry DTO.

use admissions_core::diff::{describe_changes, has_change, FieldChange};
use admissions_core::entity::{EntityKind, EntityRef};
use admissions_core::error::CoreError;
use admissions_core::timeline::{self, event_types};
use admissions_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;

/// A row from the `timeline_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEvent {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub entity_type: EntityKind,
    pub entity_id: DbId,
    pub event_type: String,
    pub title: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub performed_by: Option<String>,
    pub created_at: Timestamp,
}

/// An event about to be appended. Built by the repositories that own the
/// mutation and written in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimelineEvent {
    pub entity: EntityRef,
    pub event_type: String,
    pub title: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub performed_by: Option<String>,
}

impl NewTimelineEvent {
    pub fn new(entity: EntityRef, event_type: &str, title: String) -> Self {
        Self {
            entity,
            event_type: event_type.to_string(),
            title,
            description: None,
            metadata: json!({}),
            performed_by: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn performed_by(mut self, actor: Option<&str>) -> Self {
        self.performed_by = actor.map(str::to_string);
        self
    }

    /// `created` event for a freshly inserted entity.
    pub fn created(entity: EntityRef, code: &str) -> Self {
        Self::new(entity, event_types::CREATED, timeline::created_title(entity.kind, code))
    }

    /// `deleted` event. The row it names no longer exists once committed.
    pub fn deleted(entity: EntityRef, code: &str) -> Self {
        Self::new(entity, event_types::DELETED, timeline::deleted_title(entity.kind, code))
    }

    /// `status_changed` or `updated` event describing `changes`.
    ///
    /// Returns `None` when nothing tracked changed.
    pub fn updated(entity: EntityRef, code: &str, changes: &[FieldChange]) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }
        let event_type = if has_change(changes, "status") {
            event_types::STATUS_CHANGED
        } else {
            event_types::UPDATED
        };
        Some(
            Self::new(entity, event_type, timeline::updated_title(entity.kind, code))
                .description(describe_changes(changes))
                .metadata(json!({ "changes": changes })),
        )
    }
}

/// DTO for a manually recorded event (note, call, meeting, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimelineEvent {
    pub entity_type: EntityKind,
    pub entity_id: DbId,
    pub event_type: String,
    pub title: String,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl CreateTimelineEvent {
    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.entity_type, self.entity_id)
    }

    /// Check the event type and title rules.
    pub fn check(&self) -> Result<(), CoreError> {
        timeline::validate_event_type(&self.event_type)?;
        timeline::validate_title(&self.title)?;
        if let Some(meta) = &self.metadata {
            if !meta.is_object() {
                return Err(CoreError::Validation(
                    "Event metadata must be a JSON object".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Convert into an appendable event.
    pub fn into_event(self, actor: Option<&str>) -> NewTimelineEvent {
        let entity = self.entity();
        let mut event = NewTimelineEvent::new(entity, &self.event_type, self.title)
            .metadata(self.metadata.unwrap_or_else(|| json!({})))
            .performed_by(actor);
        event.description = self.description;
        event
    }
}

/// Filters for the timeline query endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineFilter {
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<DbId>,
    pub event_type: Option<String>,
    pub performed_by: Option<String>,
}
