//! Handlers for the `/applications` resource.

use admissions_core::error::CoreError;
use admissions_core::types::DbId;
use admissions_db::models::application::{
    Application, ApplicationFilter, CreateApplication, UpdateApplication,
};
use admissions_db::repositories::ApplicationRepo;
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
        entity: "Application",
        id,
    })
}

/// POST /api/v1/applications
///
/// An unknown `student_id` or lookup id surfaces as a 400 from the foreign key.
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateApplication>,
) -> AppResult<(StatusCode, Json<DataResponse<Application>>)> {
    input.validate()?;
    let application = ApplicationRepo::create(&state.pool, &input, actor.performed_by()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: application })))
}

/// GET /api/v1/applications?page&page_size&student_id&status
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<ApplicationFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<Application>>> {
    let page = params.page_request();
    let applications = ApplicationRepo::list(&state.pool, &filter, page).await?;
    let total = ApplicationRepo::count(&state.pool, &filter).await?;
    Ok(Json(PaginatedResponse::new(applications, total, page)))
}

/// GET /api/v1/applications/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Application>>> {
    let application = ApplicationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: application }))
}

/// PATCH /api/v1/applications/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateApplication>,
) -> AppResult<Json<DataResponse<Application>>> {
    input.validate()?;
    let application = ApplicationRepo::update(&state.pool, id, &input, actor.performed_by())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: application }))
}

/// DELETE /api/v1/applications/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ApplicationRepo::delete(&state.pool, id, actor.performed_by()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
