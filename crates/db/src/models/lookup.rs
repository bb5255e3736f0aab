//! Lookup value model and DTOs.

use admissions_core::lookup::LookupKind;
use admissions_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `lookup_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LookupValue {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub kind: LookupKind,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_default: bool,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lookup value. The kind comes from the URL path.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateLookupValue {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

/// DTO for updating a lookup value. All fields optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLookupValue {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}
