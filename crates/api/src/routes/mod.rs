pub mod applications;
pub mod auth;
pub mod health;
pub mod leads;
pub mod lookups;
pub mod students;
pub mod tasks;
pub mod timeline;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/me                                     current user
///
/// /leads                                       list, create
/// /leads/{id}                                  get, update, delete
/// /leads/{id}/convert                          convert to student (POST)
///
/// /students                                    list, create
/// /students/{id}                               get, update, delete
/// /students/{id}/documents                     add document (POST)
/// /students/{id}/documents/{index}             remove document (DELETE)
///
/// /applications                                list, create
/// /applications/{id}                           get, update, delete
///
/// /tasks                                       list, create
/// /tasks/{id}                                  get, update, delete
///
/// /timeline                                    query, record manual event
/// /timeline/{entity_type}/{entity_id}          events for one entity
///
/// /lookups/{kind}                              list, create (admin)
/// /lookups/{kind}/{id}                         get, update, delete (admin)
/// /lookups/{kind}/{id}/default                 make default (PUT, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/leads", leads::router())
        .nest("/students", students::router())
        .nest("/applications", applications::router())
        .nest("/tasks", tasks::router())
        .nest("/timeline", timeline::router())
        .nest("/lookups", lookups::router())
}
