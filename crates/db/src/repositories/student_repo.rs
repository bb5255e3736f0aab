//! Repository for the `students` table and its document descriptors.

use admissions_core::diff::diff_serialized;
use admissions_core::entity::{EntityKind, EntityRef};
use admissions_core::error::CoreError;
use admissions_core::pagination::PageRequest;
use admissions_core::sequence::STUDENT_PREFIX;
use admissions_core::timeline::{event_types, updated_title};
use admissions_core::types::DbId;
use chrono::Utc;
use serde_json::json;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::filter::Filter;
use super::lead_repo::delete_owned_tasks;
use super::sequence_repo::SequenceRepo;
use super::timeline_repo::TimelineRepo;
use crate::error::RepoError;
use crate::models::student::{
    self as student_model, CreateStudent, Student, StudentDocument, StudentFilter, UpdateStudent,
};
use crate::models::timeline::NewTimelineEvent;

pub(crate) const COLUMNS: &str = "id, student_id, first_name, last_name, date_of_birth, \
    gender, nationality, passport_number, email, phone, address, city, country, \
    previous_school, graduation_year, gpa, degree_id, faculty_id, specialty_id, \
    father_name, mother_name, guardian_phone, documents, metadata, created_at, updated_at";

const SEARCH_COLUMNS: &[&str] = &[
    "student_id",
    "first_name",
    "last_name",
    "(first_name || ' ' || last_name)",
    "email",
];

/// Provides CRUD operations for students.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a student with the next `STU-` code and record its `created` event.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStudent,
        actor: Option<&str>,
    ) -> Result<Student, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let code = SequenceRepo::next_code(&mut tx, STUDENT_PREFIX).await?;
        let student = Self::insert(&mut tx, &code, input, &json!({})).await?;

        let event = NewTimelineEvent::created(EntityRef::student(student.id), &student.student_id)
            .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(student)
    }

    /// Insert the row inside an open transaction. The caller owns the code
    /// allocation and the timeline event.
    pub(crate) async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        input: &CreateStudent,
        metadata: &serde_json::Value,
    ) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students \
                (student_id, first_name, last_name, date_of_birth, gender, nationality, \
                 passport_number, email, phone, address, city, country, previous_school, \
                 graduation_year, gpa, degree_id, faculty_id, specialty_id, father_name, \
                 mother_name, guardian_phone, documents, metadata) \
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                     $14, $15, $16, $17, $18, $19, $20, $21, $22, $23) \
             RETURNING {COLUMNS}"
        );
        let documents: Vec<StudentDocument> = input
            .documents
            .iter()
            .cloned()
            .map(stamp_upload)
            .collect();
        sqlx::query_as::<_, Student>(&query)
            .bind(code)
            .bind(input.first_name.trim())
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(input.date_of_birth)
            .bind(&input.gender)
            .bind(&input.nationality)
            .bind(&input.passport_number)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.country)
            .bind(&input.previous_school)
            .bind(input.graduation_year)
            .bind(input.gpa)
            .bind(input.degree_id)
            .bind(input.faculty_id)
            .bind(input.specialty_id)
            .bind(&input.father_name)
            .bind(&input.mother_name)
            .bind(&input.guardian_phone)
            .bind(Json(&documents))
            .bind(metadata)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List students matching the filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &StudentFilter,
        page: PageRequest,
    ) -> Result<Vec<Student>, sqlx::Error> {
        let f = build_filter(filter);
        let idx = f.limit_idx();
        let query = format!(
            "SELECT {COLUMNS} FROM students {} ORDER BY created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        f.bind_as(sqlx::query_as::<_, Student>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &StudentFilter) -> Result<i64, sqlx::Error> {
        let f = build_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM students {}", f.where_clause());
        f.bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the student does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStudent,
        actor: Option<&str>,
    ) -> Result<Option<Student>, RepoError> {
        let mut tx = pool.begin().await?;
        let Some(before) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE students SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                date_of_birth = COALESCE($4, date_of_birth), \
                gender = COALESCE($5, gender), \
                nationality = COALESCE($6, nationality), \
                passport_number = COALESCE($7, passport_number), \
                email = COALESCE($8, email), \
                phone = COALESCE($9, phone), \
                address = COALESCE($10, address), \
                city = COALESCE($11, city), \
                country = COALESCE($12, country), \
                previous_school = COALESCE($13, previous_school), \
                graduation_year = COALESCE($14, graduation_year), \
                gpa = COALESCE($15, gpa), \
                degree_id = COALESCE($16, degree_id), \
                faculty_id = COALESCE($17, faculty_id), \
                specialty_id = COALESCE($18, specialty_id), \
                father_name = COALESCE($19, father_name), \
                mother_name = COALESCE($20, mother_name), \
                guardian_phone = COALESCE($21, guardian_phone) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let after = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(input.first_name.as_deref().map(str::trim))
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(input.date_of_birth)
            .bind(&input.gender)
            .bind(&input.nationality)
            .bind(&input.passport_number)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.country)
            .bind(&input.previous_school)
            .bind(input.graduation_year)
            .bind(input.gpa)
            .bind(input.degree_id)
            .bind(input.faculty_id)
            .bind(input.specialty_id)
            .bind(&input.father_name)
            .bind(&input.mother_name)
            .bind(&input.guardian_phone)
            .fetch_one(&mut *tx)
            .await?;

        let changes = diff_serialized(&before, &after, student_model::TRACKED_FIELDS)?;
        if let Some(event) =
            NewTimelineEvent::updated(EntityRef::student(id), &after.student_id, &changes)
        {
            TimelineRepo::append(&mut tx, &event.performed_by(actor)).await?;
        }

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Delete a student together with its applications and every task they own.
    ///
    /// Each removed application gets its own `deleted` event.
    pub async fn delete(pool: &PgPool, id: DbId, actor: Option<&str>) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(student) = Self::lock(&mut tx, id).await? else {
            return Ok(false);
        };

        let applications = sqlx::query_as::<_, (DbId, String)>(
            "DELETE FROM applications WHERE student_id = $1 RETURNING id, application_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        for (app_id, app_code) in &applications {
            let entity = EntityRef::new(EntityKind::Application, *app_id);
            delete_owned_tasks(&mut tx, entity).await?;
            let event = NewTimelineEvent::deleted(entity, app_code)
                .description(format!("Removed with student {}", student.student_id))
                .performed_by(actor);
            TimelineRepo::append(&mut tx, &event).await?;
        }

        let entity = EntityRef::student(id);
        delete_owned_tasks(&mut tx, entity).await?;
        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        TimelineRepo::append(
            &mut tx,
            &NewTimelineEvent::deleted(entity, &student.student_id).performed_by(actor),
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Append a document descriptor. Returns `None` if the student does not exist.
    pub async fn add_document(
        pool: &PgPool,
        id: DbId,
        document: StudentDocument,
        actor: Option<&str>,
    ) -> Result<Option<Student>, sqlx::Error> {
        let document = stamp_upload(document);
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE students SET documents = documents || jsonb_build_array($2::jsonb) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let Some(student) = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(Json(&document))
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let event = NewTimelineEvent::new(
            EntityRef::student(id),
            event_types::UPDATED,
            updated_title(EntityKind::Student, &student.student_id),
        )
        .description(format!("Document added: {}", document.name))
        .metadata(json!({ "document": document }))
        .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(Some(student))
    }

    /// Remove the document at `index`. Returns `None` if the student does not exist.
    pub async fn remove_document(
        pool: &PgPool,
        id: DbId,
        index: usize,
        actor: Option<&str>,
    ) -> Result<Option<Student>, RepoError> {
        let mut tx = pool.begin().await?;
        let Some(before) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };
        let Some(removed) = before.documents.0.get(index).cloned() else {
            return Err(CoreError::NotFound {
                entity: "Document",
                id: DbId::try_from(index).unwrap_or(DbId::MAX),
            }
            .into());
        };

        let query = format!(
            "UPDATE students SET documents = documents - $2::int \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(index as i32)
            .fetch_one(&mut *tx)
            .await?;

        let event = NewTimelineEvent::new(
            EntityRef::student(id),
            event_types::UPDATED,
            updated_title(EntityKind::Student, &student.student_id),
        )
        .description(format!("Document removed: {}", removed.name))
        .metadata(json!({ "document": removed }))
        .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(Some(student))
    }

    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

/// Fill in the upload time when the client did not send one.
fn stamp_upload(mut document: StudentDocument) -> StudentDocument {
    document.uploaded_at.get_or_insert_with(Utc::now);
    document
}

fn build_filter(filter: &StudentFilter) -> Filter {
    let mut f = Filter::new();
    f.search(SEARCH_COLUMNS, filter.search.as_deref());
    f
}
