//! Route definitions for the `/lookups` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::lookups;
use crate::state::AppState;

/// Routes mounted at `/lookups`. `{kind}` is one of `degree`, `faculty`,
/// `academic-year`, `semester`, `city`, `language`, `specialty`.
///
/// ```text
/// GET    /{kind}                -> list
/// POST   /{kind}                -> create (admin)
/// GET    /{kind}/{id}           -> get_by_id
/// PATCH  /{kind}/{id}           -> update (admin)
/// DELETE /{kind}/{id}           -> delete (admin)
/// PUT    /{kind}/{id}/default   -> set_default (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}", get(lookups::list).post(lookups::create))
        .route(
            "/{kind}/{id}",
            get(lookups::get_by_id)
                .patch(lookups::update)
                .delete(lookups::delete),
        )
        .route("/{kind}/{id}/default", put(lookups::set_default))
}
