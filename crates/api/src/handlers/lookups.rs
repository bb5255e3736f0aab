//! Handlers for the `/lookups/{kind}` resource.
//!
//! Reads are open to any authenticated user. Writes require the admin role.

use admissions_core::error::CoreError;
use admissions_core::lookup::LookupKind;
use admissions_core::types::DbId;
use admissions_db::models::lookup::{CreateLookupValue, LookupValue, UpdateLookupValue};
use admissions_db::repositories::LookupRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(kind: LookupKind, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: kind.entity_name(),
        id,
    })
}

/// GET /api/v1/lookups/{kind}?include_inactive
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(kind): Path<String>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<LookupValue>>>> {
    let kind: LookupKind = kind.parse()?;
    let values = LookupRepo::list(&state.pool, kind, params.include_inactive).await?;
    Ok(Json(DataResponse { data: values }))
}

/// GET /api/v1/lookups/{kind}/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<LookupValue>>> {
    let kind: LookupKind = kind.parse()?;
    let value = LookupRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or_else(|| not_found(kind, id))?;
    Ok(Json(DataResponse { data: value }))
}

/// POST /api/v1/lookups/{kind}
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(kind): Path<String>,
    Json(input): Json<CreateLookupValue>,
) -> AppResult<(StatusCode, Json<DataResponse<LookupValue>>)> {
    let kind: LookupKind = kind.parse()?;
    input.validate()?;
    let value = LookupRepo::create(&state.pool, kind, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: value })))
}

/// PATCH /api/v1/lookups/{kind}/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((kind, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateLookupValue>,
) -> AppResult<Json<DataResponse<LookupValue>>> {
    let kind: LookupKind = kind.parse()?;
    input.validate()?;
    let value = LookupRepo::update(&state.pool, kind, id, &input)
        .await?
        .ok_or_else(|| not_found(kind, id))?;
    Ok(Json(DataResponse { data: value }))
}

/// DELETE /api/v1/lookups/{kind}/{id}
///
/// References from students and applications are cleared by the foreign keys.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let kind: LookupKind = kind.parse()?;
    if LookupRepo::delete(&state.pool, kind, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(kind, id))
    }
}

/// PUT /api/v1/lookups/{kind}/{id}/default
pub async fn set_default(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<LookupValue>>> {
    let kind: LookupKind = kind.parse()?;
    let value = LookupRepo::set_default(&state.pool, kind, id).await?;

    tracing::info!(
        kind = %kind,
        id = value.id,
        name = %value.name,
        user_id = admin.user_id,
        "Lookup default changed"
    );

    Ok(Json(DataResponse { data: value }))
}
