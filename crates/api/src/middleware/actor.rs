//! Audit actor extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Header a client sets to name the person behind a shared service login.
pub const PERFORMED_BY_HEADER: &str = "x-performed-by";

/// Upper bound on the header value stored as `performed_by`.
const MAX_ACTOR_LEN: usize = 100;

/// An authenticated user plus the name timeline events are attributed to.
///
/// The name is the trimmed `x-performed-by` header when present, otherwise the
/// token's username.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: AuthUser,
    pub name: String,
}

impl Actor {
    /// The attribution in the shape the repositories take.
    pub fn performed_by(&self) -> Option<&str> {
        Some(self.name.as_str())
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let name = header_actor(&parts.headers).unwrap_or_else(|| user.username.clone());
        Ok(Actor { user, name })
    }
}

/// Read the `x-performed-by` header, ignoring blank or non-ASCII values.
pub fn header_actor(headers: &HeaderMap) -> Option<String> {
    headers
        .get(PERFORMED_BY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.chars().take(MAX_ACTOR_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_value_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(PERFORMED_BY_HEADER, HeaderValue::from_static("  Sara K  "));
        assert_eq!(header_actor(&headers).as_deref(), Some("Sara K"));
    }

    #[test]
    fn blank_or_missing_header_is_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_actor(&headers), None);
        headers.insert(PERFORMED_BY_HEADER, HeaderValue::from_static("   "));
        assert_eq!(header_actor(&headers), None);
    }

    #[test]
    fn long_values_are_truncated() {
        let mut headers = HeaderMap::new();
        let long = "x".repeat(150);
        headers.insert(PERFORMED_BY_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_eq!(header_actor(&headers).unwrap().len(), MAX_ACTOR_LEN);
    }
}
