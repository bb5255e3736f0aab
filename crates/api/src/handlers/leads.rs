//! Handlers for the `/leads` resource.

use admissions_core::error::CoreError;
use admissions_core::types::DbId;
use admissions_db::models::lead::{CreateLead, Lead, LeadFilter, UpdateLead};
use admissions_db::models::student::Student;
use admissions_db::repositories::LeadRepo;
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
    AppError::Core(CoreError::NotFound { entity: "Lead", id })
}

/// POST /api/v1/leads
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateLead>,
) -> AppResult<(StatusCode, Json<DataResponse<Lead>>)> {
    input.validate()?;
    let lead = LeadRepo::create(&state.pool, &input, actor.performed_by()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lead })))
}

/// GET /api/v1/leads?page&page_size&search&status&type
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<LeadFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<Lead>>> {
    let page = params.page_request();
    let leads = LeadRepo::list(&state.pool, &filter, page).await?;
    let total = LeadRepo::count(&state.pool, &filter).await?;
    Ok(Json(PaginatedResponse::new(leads, total, page)))
}

/// GET /api/v1/leads/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lead>>> {
    let lead = LeadRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: lead }))
}

/// PATCH /api/v1/leads/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLead>,
) -> AppResult<Json<DataResponse<Lead>>> {
    input.validate()?;
    let lead = LeadRepo::update(&state.pool, id, &input, actor.performed_by())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: lead }))
}

/// DELETE /api/v1/leads/{id}
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if LeadRepo::delete(&state.pool, id, actor.performed_by()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/leads/{id}/convert
///
/// Turns a student-type lead into a Student record. Returns the new student.
pub async fn convert(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Student>>)> {
    let (lead, student) = LeadRepo::convert_to_student(&state.pool, id, actor.performed_by()).await?;

    tracing::info!(
        lead_id = %lead.lead_id,
        student_id = %student.student_id,
        performed_by = %actor.name,
        "Lead converted to student"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}
