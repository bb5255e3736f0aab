//! Handlers for the `/tasks` resource.

use admissions_core::error::CoreError;
use admissions_core::types::DbId;
use admissions_db::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use admissions_db::repositories::TaskRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::Actor;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    input.validate()?;
    let task = TaskRepo::create(&state.pool, &input, actor.performed_by()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks?entity_type&entity_id&status&assigned_to&page&page_size
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<TaskFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<Task>>> {
    let page = params.page_request();
    let tasks = TaskRepo::list(&state.pool, &filter, page).await?;
    let total = TaskRepo::count(&state.pool, &filter).await?;
    Ok(Json(PaginatedResponse::new(tasks, total, page)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: task }))
}

/// PATCH /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    input.validate()?;
    let task = TaskRepo::update(&state.pool, id, &input, actor.performed_by())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, id, actor.performed_by()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
