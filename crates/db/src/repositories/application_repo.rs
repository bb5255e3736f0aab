//! Repository for the `applications` table.

use admissions_core::application::ApplicationStatus;
use admissions_core::diff::diff_serialized;
use admissions_core::entity::EntityRef;
use admissions_core::pagination::PageRequest;
use admissions_core::sequence::APPLICATION_PREFIX;
use admissions_core::types::DbId;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use super::filter::Filter;
use super::lead_repo::delete_owned_tasks;
use super::sequence_repo::SequenceRepo;
use super::timeline_repo::TimelineRepo;
use crate::error::RepoError;
use crate::models::application::{
    self as application_model, Application, ApplicationFilter, CreateApplication,
    UpdateApplication,
};
use crate::models::timeline::NewTimelineEvent;

const COLUMNS: &str = "id, application_id, student_id, degree_id, faculty_id, specialty_id, \
    academic_year_id, semester_id, status, notes, created_at, updated_at";

/// Provides CRUD operations for applications.
pub struct ApplicationRepo;

impl ApplicationRepo {
    /// Insert an application with the next `APP-` code.
    ///
    /// An unknown `student_id` fails on the foreign key and nothing is written.
    pub async fn create(
        pool: &PgPool,
        input: &CreateApplication,
        actor: Option<&str>,
    ) -> Result<Application, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let code = SequenceRepo::next_code(&mut tx, APPLICATION_PREFIX).await?;

        let query = format!(
            "INSERT INTO applications \
                (application_id, student_id, degree_id, faculty_id, specialty_id, \
                 academic_year_id, semester_id, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(&code)
            .bind(input.student_id)
            .bind(input.degree_id)
            .bind(input.faculty_id)
            .bind(input.specialty_id)
            .bind(input.academic_year_id)
            .bind(input.semester_id)
            .bind(input.status.unwrap_or(ApplicationStatus::Draft).as_str())
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let event = NewTimelineEvent::created(
            EntityRef::application(application.id),
            &application.application_id,
        )
        .metadata(json!({ "student_id": application.student_id }))
        .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(application)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Application>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applications WHERE id = $1");
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List applications matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let f = build_filter(filter);
        let idx = f.limit_idx();
        let query = format!(
            "SELECT {COLUMNS} FROM applications {} ORDER BY created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        f.bind_as(sqlx::query_as::<_, Application>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &ApplicationFilter) -> Result<i64, sqlx::Error> {
        let f = build_filter(filter);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM applications {}",
            f.where_clause()
        );
        f.bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the application does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateApplication,
        actor: Option<&str>,
    ) -> Result<Option<Application>, RepoError> {
        let mut tx = pool.begin().await?;
        let Some(before) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE applications SET \
                degree_id = COALESCE($2, degree_id), \
                faculty_id = COALESCE($3, faculty_id), \
                specialty_id = COALESCE($4, specialty_id), \
                academic_year_id = COALESCE($5, academic_year_id), \
                semester_id = COALESCE($6, semester_id), \
                status = COALESCE($7, status), \
                notes = COALESCE($8, notes) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let after = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(input.degree_id)
            .bind(input.faculty_id)
            .bind(input.specialty_id)
            .bind(input.academic_year_id)
            .bind(input.semester_id)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let changes = diff_serialized(&before, &after, application_model::TRACKED_FIELDS)?;
        if let Some(event) = NewTimelineEvent::updated(
            EntityRef::application(id),
            &after.application_id,
            &changes,
        ) {
            TimelineRepo::append(&mut tx, &event.performed_by(actor)).await?;
        }

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Delete an application and its tasks. Returns `false` if no row existed.
    pub async fn delete(pool: &PgPool, id: DbId, actor: Option<&str>) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let code = sqlx::query_scalar::<_, String>(
            "DELETE FROM applications WHERE id = $1 RETURNING application_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(code) = code else {
            return Ok(false);
        };

        let entity = EntityRef::application(id);
        delete_owned_tasks(&mut tx, entity).await?;
        TimelineRepo::append(&mut tx, &NewTimelineEvent::deleted(entity, &code).performed_by(actor))
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Application>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applications WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

fn build_filter(filter: &ApplicationFilter) -> Filter {
    let mut f = Filter::new();
    f.eq_bigint("student_id", filter.student_id)
        .eq_text("status", filter.status.map(|s| s.as_str()));
    f
}
