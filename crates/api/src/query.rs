//! Shared query parameter types for API handlers.

use admissions_core::pagination::PageRequest;
use serde::Deserialize;

/// Page-number pagination parameters (`?page=&page_size=`).
///
/// Out-of-range values are clamped rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}
