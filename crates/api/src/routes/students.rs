//! Route definitions for the `/students` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update
/// DELETE /{id}                    -> delete
/// POST   /{id}/documents          -> add_document
/// DELETE /{id}/documents/{index}  -> remove_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(students::list).post(students::create))
        .route(
            "/{id}",
            get(students::get_by_id)
                .patch(students::update)
                .delete(students::delete),
        )
        .route("/{id}/documents", post(students::add_document))
        .route(
            "/{id}/documents/{index}",
            delete(students::remove_document),
        )
}
