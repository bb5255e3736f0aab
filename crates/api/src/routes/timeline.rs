//! Route definitions for the `/timeline` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::timeline;
use crate::state::AppState;

/// Routes mounted at `/timeline`.
///
/// ```text
/// GET  /                              -> query
/// POST /                              -> create
/// GET  /{entity_type}/{entity_id}     -> list_for_entity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(timeline::query).post(timeline::create))
        .route("/{entity_type}/{entity_id}", get(timeline::list_for_entity))
}
