//! Handlers for the `/timeline` resource.
//!
//! Events are append-only: there is no update or delete route.

use admissions_core::entity::{EntityKind, EntityRef};
use admissions_core::types::DbId;
use admissions_db::models::timeline::{CreateTimelineEvent, TimelineEvent, TimelineFilter};
use admissions_db::repositories::TimelineRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

/// POST /api/v1/timeline
///
/// Records a manual event (note, call, meeting, ...) against an existing entity.
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateTimelineEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<TimelineEvent>>)> {
    let event = TimelineRepo::create_manual(&state.pool, input, actor.performed_by()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/timeline?entity_type&entity_id&event_type&performed_by&page&page_size
pub async fn query(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<TimelineFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<TimelineEvent>>> {
    let page = params.page_request();
    let events = TimelineRepo::query(&state.pool, &filter, page).await?;
    let total = TimelineRepo::count(&state.pool, &filter).await?;
    Ok(Json(PaginatedResponse::new(events, total, page)))
}

/// GET /api/v1/timeline/{entity_type}/{entity_id}
///
/// Newest first. An unknown entity yields an empty page, since events outlive
/// the entities they describe.
pub async fn list_for_entity(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((entity_type, entity_id)): Path<(String, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedResponse<TimelineEvent>>> {
    let kind: EntityKind = entity_type.parse()?;
    let entity = EntityRef::new(kind, entity_id);
    let page = params.page_request();

    let events = TimelineRepo::list_for_entity(&state.pool, entity, page).await?;
    let total = TimelineRepo::count_for_entity(&state.pool, entity).await?;
    Ok(Json(PaginatedResponse::new(events, total, page)))
}
