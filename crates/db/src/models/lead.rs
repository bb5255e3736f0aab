//! Lead entity model and DTOs.

use admissions_core::diff::{tracked, TrackedField};
use admissions_core::lead::{LeadStatus, LeadType};
use admissions_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `leads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub lead_id: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub lead_type: LeadType,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub agency_name: Option<String>,
    pub preferred_program: Option<String>,
    pub preferred_degree: Option<String>,
    pub preferred_intake: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: LeadStatus,
    pub converted_to_student_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lead {
    /// A lead stays converted even after its student is deleted.
    pub fn is_converted(&self) -> bool {
        self.status == LeadStatus::Converted || self.converted_to_student_id.is_some()
    }
}

/// Fields compared when describing a lead update on the timeline.
pub const TRACKED_FIELDS: &[TrackedField] = &[
    tracked("type", "Type"),
    tracked("full_name", "Full name"),
    tracked("email", "Email"),
    tracked("phone", "Phone"),
    tracked("country", "Country"),
    tracked("city", "City"),
    tracked("source", "Source"),
    tracked("agency_name", "Agency"),
    tracked("preferred_program", "Preferred program"),
    tracked("preferred_degree", "Preferred degree"),
    tracked("preferred_intake", "Preferred intake"),
    tracked("notes", "Notes"),
    tracked("assigned_to", "Assigned to"),
    tracked("status", "Status"),
];

/// DTO for creating a lead. `lead_id` and `status` are assigned by the server.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLead {
    #[serde(rename = "type")]
    pub lead_type: LeadType,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub agency_name: Option<String>,
    pub preferred_program: Option<String>,
    pub preferred_degree: Option<String>,
    pub preferred_intake: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
}

/// DTO for updating a lead. All fields optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLead {
    #[serde(rename = "type")]
    pub lead_type: Option<LeadType>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub agency_name: Option<String>,
    pub preferred_program: Option<String>,
    pub preferred_degree: Option<String>,
    pub preferred_intake: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<LeadStatus>,
}

/// Filters for listing leads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    #[serde(rename = "type")]
    pub lead_type: Option<LeadType>,
}
