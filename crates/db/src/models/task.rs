//! Follow-up task model and DTOs.

use admissions_core::diff::{tracked, TrackedField};
use admissions_core::entity::{EntityKind, EntityRef};
use admissions_core::task::{TaskPriority, TaskStatus};
use admissions_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub entity_type: EntityKind,
    pub entity_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// The entity this task belongs to.
    pub fn owner(&self) -> EntityRef {
        EntityRef::new(self.entity_type, self.entity_id)
    }
}

pub const TRACKED_FIELDS: &[TrackedField] = &[
    tracked("title", "Title"),
    tracked("description", "Description"),
    tracked("due_date", "Due date"),
    tracked("priority", "Priority"),
    tracked("status", "Status"),
    tracked("assigned_to", "Assigned to"),
];

/// DTO for creating a task on an existing entity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    pub entity_type: EntityKind,
    pub entity_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
}

impl CreateTask {
    pub fn owner(&self) -> EntityRef {
        EntityRef::new(self.entity_type, self.entity_id)
    }
}

/// DTO for updating a task. The owner cannot change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
}

/// Filters for listing tasks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<DbId>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
}
