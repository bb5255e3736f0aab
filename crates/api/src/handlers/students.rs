//! Handlers for the `/students` resource, including document descriptors.

use admissions_core::error::CoreError;
use admissions_core::types::DbId;
use admissions_db::models::student::{
    CreateStudent, Student, StudentDocument, StudentFilter, UpdateStudent,
};
use admissions_db::repositories::StudentRepo;
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
    AppError::Core(CoreError::NotFound {
        entity: "Student",
        id,
    })
}

/// POST /api/v1/students
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<DataResponse<Student>>)> {
    input.validate()?;
    let student = StudentRepo::create(&state.pool, &input, actor.performed_by()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}

/// GET /api/v1/students?page&page_size&search
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<StudentFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<Student>>> {
    let page = params.page_request();
    let students = StudentRepo::list(&state.pool, &filter, page).await?;
    let total = StudentRepo::count(&state.pool, &filter).await?;
    Ok(Json(PaginatedResponse::new(students, total, page)))
}

/// GET /api/v1/students/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Student>>> {
    let student = StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: student }))
}

/// PATCH /api/v1/students/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStudent>,
) -> AppResult<Json<DataResponse<Student>>> {
    input.validate()?;
    let student = StudentRepo::update(&state.pool, id, &input, actor.performed_by())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: student }))
}

/// DELETE /api/v1/students/{id}
///
/// Also removes the student's applications and every task they own.
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if StudentRepo::delete(&state.pool, id, actor.performed_by()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/students/{id}/documents
pub async fn add_document(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(document): Json<StudentDocument>,
) -> AppResult<(StatusCode, Json<DataResponse<Student>>)> {
    document.validate()?;
    let student = StudentRepo::add_document(&state.pool, id, document, actor.performed_by())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}

/// DELETE /api/v1/students/{id}/documents/{index}
pub async fn remove_document(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, index)): Path<(DbId, usize)>,
) -> AppResult<Json<DataResponse<Student>>> {
    let student = StudentRepo::remove_document(&state.pool, id, index, actor.performed_by())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: student }))
}
