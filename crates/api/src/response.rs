//! Shared response envelope types for API handlers.
//!
//! Single resources use `{ "data": ... }`. Lists add pagination metadata.

use admissions_core::pagination::{total_pages, PageRequest};
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ data, total, page, page_size, total_pages }` envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: PageRequest) -> Self {
        Self {
            data,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages: total_pages(total, page.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_shape() {
        let page = PageRequest::new(Some(2), Some(10));
        let body = serde_json::to_value(PaginatedResponse::new(vec![1, 2, 3], 23, page)).unwrap();
        assert_eq!(body["total"], 23);
        assert_eq!(body["page"], 2);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }
}
