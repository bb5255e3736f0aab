//! Repository for the `tasks` table.
//!
//! Task events are recorded on the owning entity's timeline.

use admissions_core::diff::{describe_changes, diff_serialized};
use admissions_core::error::CoreError;
use admissions_core::pagination::PageRequest;
use admissions_core::task::{self, TaskPriority, TaskStatus};
use admissions_core::timeline::event_types;
use admissions_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use super::entity_repo::EntityRepo;
use super::filter::Filter;
use super::timeline_repo::TimelineRepo;
use crate::error::RepoError;
use crate::models::task::{self as task_model, CreateTask, Task, TaskFilter, UpdateTask};
use crate::models::timeline::NewTimelineEvent;

const COLUMNS: &str = "id, entity_type, entity_id, title, description, due_date, priority, \
    status, assigned_to, completed_at, created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task on an existing entity and record `task_created` on it.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTask,
        actor: Option<&str>,
    ) -> Result<Task, RepoError> {
        let owner = input.owner();
        let mut tx = pool.begin().await?;
        if !EntityRepo::exists(&mut *tx, owner).await? {
            return Err(CoreError::NotFound {
                entity: owner.kind.entity_name(),
                id: owner.id,
            }
            .into());
        }

        let status = input.status.unwrap_or(TaskStatus::Open);
        let completed_at: Option<Timestamp> = (status == TaskStatus::Completed).then(Utc::now);
        let query = format!(
            "INSERT INTO tasks \
                (entity_type, entity_id, title, description, due_date, priority, status, \
                 assigned_to, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Task>(&query)
            .bind(owner.kind.as_str())
            .bind(owner.id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.due_date)
            .bind(input.priority.unwrap_or(TaskPriority::Medium).as_str())
            .bind(status.as_str())
            .bind(&input.assigned_to)
            .bind(completed_at)
            .fetch_one(&mut *tx)
            .await?;

        let event = NewTimelineEvent::new(
            owner,
            event_types::TASK_CREATED,
            format!("Task created: {}", created.title),
        )
        .metadata(json!({
            "task_id": created.id,
            "priority": created.priority,
            "due_date": created.due_date,
            "assigned_to": created.assigned_to,
        }))
        .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks matching the filter: soonest due first, undated last.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let f = build_filter(filter);
        let idx = f.limit_idx();
        let query = format!(
            "SELECT {COLUMNS} FROM tasks {} \
             ORDER BY due_date ASC NULLS LAST, created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        f.bind_as(sqlx::query_as::<_, Task>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let f = build_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM tasks {}", f.where_clause());
        f.bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the task does not exist.
    ///
    /// Moving to `Completed` stamps `completed_at` and records
    /// `task_completed`; leaving `Completed` clears it. Other changes record
    /// `task_updated`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
        actor: Option<&str>,
    ) -> Result<Option<Task>, RepoError> {
        let mut tx = pool.begin().await?;
        let Some(before) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let new_status = input.status.unwrap_or(before.status);
        let completing = task::is_completion(before.status, new_status);
        let completed_at = if completing {
            Some(Utc::now())
        } else if task::is_reopening(before.status, new_status) {
            None
        } else {
            before.completed_at
        };

        let query = format!(
            "UPDATE tasks SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                due_date = COALESCE($4, due_date), \
                priority = COALESCE($5, priority), \
                status = $6, \
                assigned_to = COALESCE($7, assigned_to), \
                completed_at = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let after = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.due_date)
            .bind(input.priority.map(|p| p.as_str()))
            .bind(new_status.as_str())
            .bind(&input.assigned_to)
            .bind(completed_at)
            .fetch_one(&mut *tx)
            .await?;

        let changes = diff_serialized(&before, &after, task_model::TRACKED_FIELDS)?;
        if !changes.is_empty() {
            let (event_type, title) = if completing {
                (event_types::TASK_COMPLETED, format!("Task completed: {}", after.title))
            } else {
                (event_types::TASK_UPDATED, format!("Task updated: {}", after.title))
            };
            let event = NewTimelineEvent::new(after.owner(), event_type, title)
                .description(describe_changes(&changes))
                .metadata(json!({ "task_id": after.id, "changes": changes }))
                .performed_by(actor);
            TimelineRepo::append(&mut tx, &event).await?;
        }

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Delete a task and record `task_deleted` on its owner.
    pub async fn delete(pool: &PgPool, id: DbId, actor: Option<&str>) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!("DELETE FROM tasks WHERE id = $1 RETURNING {COLUMNS}");
        let Some(removed) = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(false);
        };

        let event = NewTimelineEvent::new(
            removed.owner(),
            event_types::TASK_DELETED,
            format!("Task deleted: {}", removed.title),
        )
        .metadata(json!({ "task_id": removed.id, "status": removed.status }))
        .performed_by(actor);
        TimelineRepo::append(&mut tx, &event).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

fn build_filter(filter: &TaskFilter) -> Filter {
    let mut f = Filter::new();
    f.eq_text("entity_type", filter.entity_type.map(|k| k.as_str()))
        .eq_bigint("entity_id", filter.entity_id)
        .eq_text("status", filter.status.map(|s| s.as_str()))
        .eq_text("assigned_to", filter.assigned_to.as_deref());
    f
}
