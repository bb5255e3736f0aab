//! Student entity model and DTOs.

use admissions_core::diff::{tracked, TrackedField};
use admissions_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub previous_school: Option<String>,
    pub graduation_year: Option<i32>,
    pub gpa: Option<f64>,
    pub degree_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub specialty_id: Option<DbId>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub documents: Json<Vec<StudentDocument>>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Descriptor of an uploaded file. The file itself lives with the upload service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StudentDocument {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(url)]
    pub file_url: String,
    pub uploaded_at: Option<Timestamp>,
}

/// Fields compared when describing a student update on the timeline.
pub const TRACKED_FIELDS: &[TrackedField] = &[
    tracked("first_name", "First name"),
    tracked("last_name", "Last name"),
    tracked("date_of_birth", "Date of birth"),
    tracked("gender", "Gender"),
    tracked("nationality", "Nationality"),
    tracked("passport_number", "Passport number"),
    tracked("email", "Email"),
    tracked("phone", "Phone"),
    tracked("address", "Address"),
    tracked("city", "City"),
    tracked("country", "Country"),
    tracked("previous_school", "Previous school"),
    tracked("graduation_year", "Graduation year"),
    tracked("gpa", "GPA"),
    tracked("degree_id", "Degree"),
    tracked("faculty_id", "Faculty"),
    tracked("specialty_id", "Specialty"),
    tracked("father_name", "Father's name"),
    tracked("mother_name", "Mother's name"),
    tracked("guardian_phone", "Guardian phone"),
];

/// DTO for creating a student directly (not via lead conversion).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub passport_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub previous_school: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub graduation_year: Option<i32>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub gpa: Option<f64>,
    pub degree_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub specialty_id: Option<DbId>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    #[validate(length(max = 50))]
    pub guardian_phone: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub documents: Vec<StudentDocument>,
}

/// DTO for updating a student. All fields optional; documents have their own endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStudent {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub passport_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub previous_school: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub graduation_year: Option<i32>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub gpa: Option<f64>,
    pub degree_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub specialty_id: Option<DbId>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    #[validate(length(max = 50))]
    pub guardian_phone: Option<String>,
}

/// Filters for listing students.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    pub search: Option<String>,
}
