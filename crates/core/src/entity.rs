//! Polymorphic entity references for timeline events and tasks.
//!
//! A timeline event or task belongs to exactly one owner, named by an
//! [`EntityRef`]. The database stores the pair as `(entity_type, entity_id)`
//! columns; there are no per-kind foreign key columns.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

define_text_enum! {
    /// Kinds of entity that can own timeline events and tasks.
    EntityKind ("entity type") {
        Lead = "Lead",
        Student = "Student",
        Application = "Application",
    }
}

impl EntityKind {
    /// Entity name used in `NotFound` errors.
    pub fn entity_name(self) -> &'static str {
        self.as_str()
    }

    /// Backing table for existence checks.
    pub fn table(self) -> &'static str {
        match self {
            Self::Lead => "leads",
            Self::Student => "students",
            Self::Application => "applications",
        }
    }
}

/// A reference to a single owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: DbId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: DbId) -> Self {
        Self { kind, id }
    }

    pub fn lead(id: DbId) -> Self {
        Self::new(EntityKind::Lead, id)
    }

    pub fn student(id: DbId) -> Self {
        Self::new(EntityKind::Student, id)
    }

    pub fn application(id: DbId) -> Self {
        Self::new(EntityKind::Application, id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
