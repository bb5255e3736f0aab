//! Repository for the append-only `timeline_events` table.

use admissions_core::entity::EntityRef;
use admissions_core::error::CoreError;
use admissions_core::pagination::PageRequest;
use admissions_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use super::entity_repo::EntityRepo;
use super::filter::Filter;
use crate::error::RepoError;
use crate::models::timeline::{CreateTimelineEvent, NewTimelineEvent, TimelineEvent, TimelineFilter};

const COLUMNS: &str = "id, entity_type, entity_id, event_type, title, description, \
    metadata, performed_by, created_at";

/// Newest first. `id` breaks ties between events sharing a timestamp.
const ORDER: &str = "ORDER BY created_at DESC, id DESC";

/// Appends and queries timeline events. There is no update or delete.
pub struct TimelineRepo;

impl TimelineRepo {
    /// Insert one event inside the caller's transaction.
    pub async fn append(
        tx: &mut Transaction<'_, Postgres>,
        event: &NewTimelineEvent,
    ) -> Result<TimelineEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_events \
                (entity_type, entity_id, event_type, title, description, metadata, performed_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(event.entity.kind.as_str())
            .bind(event.entity.id)
            .bind(&event.event_type)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.metadata)
            .bind(&event.performed_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Record a manual event after checking its fields and its entity.
    pub async fn create_manual(
        pool: &PgPool,
        input: CreateTimelineEvent,
        actor: Option<&str>,
    ) -> Result<TimelineEvent, RepoError> {
        input.check()?;
        let entity = input.entity();

        let mut tx = pool.begin().await?;
        if !EntityRepo::exists(&mut *tx, entity).await? {
            return Err(CoreError::NotFound {
                entity: entity.kind.entity_name(),
                id: entity.id,
            }
            .into());
        }
        let event = Self::append(&mut tx, &input.into_event(actor)).await?;
        tx.commit().await?;
        Ok(event)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_events WHERE id = $1");
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All events for one entity, newest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity: EntityRef,
        page: PageRequest,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_events \
             WHERE entity_type = $1 AND entity_id = $2 \
             {ORDER} LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(entity.kind.as_str())
            .bind(entity.id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_entity(pool: &PgPool, entity: EntityRef) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM timeline_events WHERE entity_type = $1 AND entity_id = $2",
        )
        .bind(entity.kind.as_str())
        .bind(entity.id)
        .fetch_one(pool)
        .await
    }

    /// Query events with optional filters, newest first.
    pub async fn query(
        pool: &PgPool,
        filter: &TimelineFilter,
        page: PageRequest,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let f = build_filter(filter);
        let idx = f.limit_idx();
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_events {} {ORDER} LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        f.bind_as(sqlx::query_as::<_, TimelineEvent>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count events matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &TimelineFilter) -> Result<i64, sqlx::Error> {
        let f = build_filter(filter);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM timeline_events {}",
            f.where_clause()
        );
        f.bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }
}

fn build_filter(filter: &TimelineFilter) -> Filter {
    let mut f = Filter::new();
    f.eq_text("entity_type", filter.entity_type.map(|k| k.as_str()))
        .eq_bigint("entity_id", filter.entity_id)
        .eq_text("event_type", filter.event_type.as_deref())
        .eq_text("performed_by", filter.performed_by.as_deref());
    f
}
