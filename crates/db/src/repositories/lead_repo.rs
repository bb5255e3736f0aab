//! Repository for the `leads` table, including conversion into a student.

use admissions_core::diff::diff_serialized;
use admissions_core::entity::EntityRef;
use admissions_core::error::CoreError;
use admissions_core::lead::{self, metadata_keys, LeadStatus};
use admissions_core::pagination::PageRequest;
use admissions_core::sequence::{LEAD_PREFIX, STUDENT_PREFIX};
use admissions_core::timeline::event_types;
use admissions_core::types::DbId;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use super::filter::Filter;
use super::sequence_repo::SequenceRepo;
use super::student_repo::StudentRepo;
use super::timeline_repo::TimelineRepo;
use crate::error::RepoError;
use crate::models::lead::{self as lead_model, CreateLead, Lead, LeadFilter, UpdateLead};
use crate::models::student::{CreateStudent, Student};
use crate::models::timeline::NewTimelineEvent;

const COLUMNS: &str = "id, lead_id, lead_type, full_name, email, phone, country, city, \
    source, agency_name, preferred_program, preferred_degree, preferred_intake, notes, \
    assigned_to, status, converted_to_student_id, created_at, updated_at";

const SEARCH_COLUMNS: &[&str] = &["lead_id", "full_name", "email", "phone"];

/// Provides CRUD and conversion for leads.
pub struct LeadRepo;

impl LeadRepo {
    /// Insert a lead with the next `LEAD-` code and record its `created` event.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLead,
        actor: Option<&str>,
    ) -> Result<Lead, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let code = SequenceRepo::next_code(&mut tx, LEAD_PREFIX).await?;

        let query = format!(
            "INSERT INTO leads \
                (lead_id, lead_type, full_name, email, phone, country, city, source, \
                 agency_name, preferred_program, preferred_degree, preferred_intake, \
                 notes, assigned_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        let lead = sqlx::query_as::<_, Lead>(&query)
            .bind(&code)
            .bind(input.lead_type.as_str())
            .bind(input.full_name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.country)
            .bind(&input.city)
            .bind(&input.source)
            .bind(&input.agency_name)
            .bind(&input.preferred_program)
            .bind(&input.preferred_degree)
            .bind(&input.preferred_intake)
            .bind(&input.notes)
            .bind(&input.assigned_to)
            .fetch_one(&mut *tx)
            .await?;

        let event = NewTimelineEvent::created(EntityRef::lead(lead.id), &lead.lead_id)
            .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(lead)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = $1");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List leads matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &LeadFilter,
        page: PageRequest,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let f = build_filter(filter);
        let idx = f.limit_idx();
        let query = format!(
            "SELECT {COLUMNS} FROM leads {} ORDER BY created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        f.bind_as(sqlx::query_as::<_, Lead>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &LeadFilter) -> Result<i64, sqlx::Error> {
        let f = build_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM leads {}", f.where_clause());
        f.bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Only non-`None` fields are written.
    ///
    /// Returns `None` if the lead does not exist. Converted leads keep their
    /// status and type, and `Converted` cannot be set here.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLead,
        actor: Option<&str>,
    ) -> Result<Option<Lead>, RepoError> {
        let mut tx = pool.begin().await?;
        let Some(before) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };
        lead::ensure_update_allowed(
            before.is_converted(),
            input.status,
            input.lead_type,
            before.status,
            before.lead_type,
        )?;

        let query = format!(
            "UPDATE leads SET \
                lead_type = COALESCE($2, lead_type), \
                full_name = COALESCE($3, full_name), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone), \
                country = COALESCE($6, country), \
                city = COALESCE($7, city), \
                source = COALESCE($8, source), \
                agency_name = COALESCE($9, agency_name), \
                preferred_program = COALESCE($10, preferred_program), \
                preferred_degree = COALESCE($11, preferred_degree), \
                preferred_intake = COALESCE($12, preferred_intake), \
                notes = COALESCE($13, notes), \
                assigned_to = COALESCE($14, assigned_to), \
                status = COALESCE($15, status) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let after = sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(input.lead_type.map(|t| t.as_str()))
            .bind(input.full_name.as_deref().map(str::trim))
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.country)
            .bind(&input.city)
            .bind(&input.source)
            .bind(&input.agency_name)
            .bind(&input.preferred_program)
            .bind(&input.preferred_degree)
            .bind(&input.preferred_intake)
            .bind(&input.notes)
            .bind(&input.assigned_to)
            .bind(input.status.map(|s| s.as_str()))
            .fetch_one(&mut *tx)
            .await?;

        let changes = diff_serialized(&before, &after, lead_model::TRACKED_FIELDS)?;
        if let Some(event) =
            NewTimelineEvent::updated(EntityRef::lead(id), &after.lead_id, &changes)
        {
            TimelineRepo::append(&mut tx, &event.performed_by(actor)).await?;
        }

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Delete a lead and its tasks. Returns `false` if no row existed.
    pub async fn delete(pool: &PgPool, id: DbId, actor: Option<&str>) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let code = sqlx::query_scalar::<_, String>("DELETE FROM leads WHERE id = $1 RETURNING lead_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(code) = code else {
            return Ok(false);
        };

        let entity = EntityRef::lead(id);
        delete_owned_tasks(&mut tx, entity).await?;
        TimelineRepo::append(&mut tx, &NewTimelineEvent::deleted(entity, &code).performed_by(actor))
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Convert a `Student` lead into a new student record.
    ///
    /// In one transaction: allocate the `STU-` code, insert the student with
    /// the lead's contact details and provenance metadata, mark the lead
    /// `Converted`, and append a `converted` event on the lead plus a
    /// `created` event on the student. Any failure leaves nothing behind.
    pub async fn convert_to_student(
        pool: &PgPool,
        id: DbId,
        actor: Option<&str>,
    ) -> Result<(Lead, Student), RepoError> {
        let mut tx = pool.begin().await?;
        let lead = Self::lock(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Lead", id })?;
        lead::ensure_convertible(
            lead.lead_type,
            lead.status,
            lead.converted_to_student_id,
            &lead.full_name,
        )?;

        let (first_name, last_name) = lead::split_full_name(&lead.full_name);
        let student_input = CreateStudent {
            first_name,
            last_name: Some(last_name),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            city: lead.city.clone(),
            country: lead.country.clone(),
            ..Default::default()
        };
        let metadata = conversion_metadata(&lead);
        let student_code = SequenceRepo::next_code(&mut tx, STUDENT_PREFIX).await?;
        let student = StudentRepo::insert(&mut tx, &student_code, &student_input, &metadata).await?;

        let query = format!(
            "UPDATE leads SET status = $2, converted_to_student_id = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let converted = sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(LeadStatus::Converted.as_str())
            .bind(student.id)
            .fetch_one(&mut *tx)
            .await?;

        let lead_event = NewTimelineEvent::new(
            EntityRef::lead(id),
            event_types::CONVERTED,
            format!("Lead {} converted to student {}", lead.lead_id, student.student_id),
        )
        .description(format!("Previous status: {}", lead.status))
        .metadata(json!({
            "student_id": student.id,
            "student_code": student.student_id,
            "previous_status": lead.status,
        }))
        .performed_by(actor);
        TimelineRepo::append(&mut tx, &lead_event).await?;

        let student_event = NewTimelineEvent::created(EntityRef::student(student.id), &student.student_id)
            .description(format!("Converted from lead {}", lead.lead_id))
            .metadata(json!({ "lead_id": lead.id, "lead_code": lead.lead_id }))
            .performed_by(actor);
        TimelineRepo::append(&mut tx, &student_event).await?;

        tx.commit().await?;
        Ok((converted, student))
    }

    /// Fetch and row-lock a lead inside a transaction.
    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

/// Provenance stored in `students.metadata` by a conversion.
fn conversion_metadata(lead: &Lead) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(metadata_keys::CONVERTED_FROM_LEAD_ID.into(), json!(lead.id));
    map.insert(metadata_keys::CONVERTED_FROM_LEAD_CODE.into(), json!(lead.lead_id));
    map.insert(metadata_keys::SOURCE.into(), json!(lead.source));
    map.insert(metadata_keys::PREFERRED_PROGRAM.into(), json!(lead.preferred_program));
    map.insert(metadata_keys::PREFERRED_DEGREE.into(), json!(lead.preferred_degree));
    map.insert(metadata_keys::PREFERRED_INTAKE.into(), json!(lead.preferred_intake));
    serde_json::Value::Object(map)
}

/// Remove the tasks owned by an entity that is being deleted.
pub(crate) async fn delete_owned_tasks(
    tx: &mut Transaction<'_, Postgres>,
    entity: EntityRef,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE entity_type = $1 AND entity_id = $2")
        .bind(entity.kind.as_str())
        .bind(entity.id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

fn build_filter(filter: &LeadFilter) -> Filter {
    let mut f = Filter::new();
    f.eq_text("status", filter.status.map(|s| s.as_str()))
        .eq_text("lead_type", filter.lead_type.map(|t| t.as_str()))
        .search(SEARCH_COLUMNS, filter.search.as_deref());
    f
}
