//! Application entity model and DTOs.

use admissions_core::application::ApplicationStatus;
use admissions_core::diff::{tracked, TrackedField};
use admissions_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Application {
    pub id: DbId,
    pub application_id: String,
    pub student_id: DbId,
    pub degree_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub specialty_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub semester_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields compared when describing an application update on the timeline.
pub const TRACKED_FIELDS: &[TrackedField] = &[
    tracked("degree_id", "Degree"),
    tracked("faculty_id", "Faculty"),
    tracked("specialty_id", "Specialty"),
    tracked("academic_year_id", "Academic year"),
    tracked("semester_id", "Semester"),
    tracked("status", "Status"),
    tracked("notes", "Notes"),
];

/// DTO for creating an application.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApplication {
    pub student_id: DbId,
    pub degree_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub specialty_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub semester_id: Option<DbId>,
    pub status: Option<ApplicationStatus>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

/// DTO for updating an application. The owning student cannot change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateApplication {
    pub degree_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub specialty_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub semester_id: Option<DbId>,
    pub status: Option<ApplicationStatus>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

/// Filters for listing applications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    pub student_id: Option<DbId>,
    pub status: Option<ApplicationStatus>,
}
