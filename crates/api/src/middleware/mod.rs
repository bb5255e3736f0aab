//! Request extractors for authentication, authorization, and audit attribution.
//!
//! - [`auth::AuthUser`] -- the user behind a valid Bearer token.
//! - [`rbac::RequireAdmin`] -- rejects non-admin users with 403.
//! - [`actor::Actor`] -- who a timeline event is attributed to.

pub mod actor;
pub mod auth;
pub mod rbac;
