//! Repository for the shared `lookup_values` table.
//!
//! Writes that can move the default take a transaction-scoped advisory lock
//! on the kind first, so concurrent toggles for one kind run one after
//! another even before the kind has any rows. The partial unique index
//! `uq_lookup_values_default` backs this up.

use admissions_core::error::CoreError;
use admissions_core::lookup::LookupKind;
use admissions_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::RepoError;
use crate::models::lookup::{CreateLookupValue, LookupValue, UpdateLookupValue};

const COLUMNS: &str = "id, kind, name, code, description, sort_order, is_active, is_default, \
    metadata, created_at, updated_at";

/// Provides CRUD and default selection for lookup values.
pub struct LookupRepo;

impl LookupRepo {
    /// List values of a kind by `sort_order`, then name.
    pub async fn list(
        pool: &PgPool,
        kind: LookupKind,
        include_inactive: bool,
    ) -> Result<Vec<LookupValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lookup_values \
             WHERE kind = $1 AND ($2 OR is_active) \
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, LookupValue>(&query)
            .bind(kind.as_str())
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        kind: LookupKind,
        id: DbId,
    ) -> Result<Option<LookupValue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lookup_values WHERE kind = $1 AND id = $2");
        sqlx::query_as::<_, LookupValue>(&query)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The current default of a kind, if any.
    pub async fn find_default(
        pool: &PgPool,
        kind: LookupKind,
    ) -> Result<Option<LookupValue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lookup_values WHERE kind = $1 AND is_default");
        sqlx::query_as::<_, LookupValue>(&query)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Insert a value. With `is_default: true` it replaces the kind's default.
    pub async fn create(
        pool: &PgPool,
        kind: LookupKind,
        input: &CreateLookupValue,
    ) -> Result<LookupValue, RepoError> {
        let is_active = input.is_active.unwrap_or(true);
        let wants_default = input.is_default.unwrap_or(false);
        if wants_default && !is_active {
            return Err(inactive_default().into());
        }

        let mut tx = pool.begin().await?;
        if wants_default {
            lock_kind(&mut tx, kind).await?;
        }

        let query = format!(
            "INSERT INTO lookup_values \
                (kind, name, code, description, sort_order, is_active, metadata) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, COALESCE($7, '{{}}'::jsonb)) \
             RETURNING {COLUMNS}"
        );
        let mut value = sqlx::query_as::<_, LookupValue>(&query)
            .bind(kind.as_str())
            .bind(input.name.trim())
            .bind(&input.code)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(is_active)
            .bind(&input.metadata)
            .fetch_one(&mut *tx)
            .await?;

        if wants_default {
            value = make_default(&mut tx, kind, value.id).await?;
        }

        tx.commit().await?;
        Ok(value)
    }

    /// Apply a partial update. Returns `None` if the value does not exist.
    ///
    /// Deactivating the default also clears its default flag.
    pub async fn update(
        pool: &PgPool,
        kind: LookupKind,
        id: DbId,
        input: &UpdateLookupValue,
    ) -> Result<Option<LookupValue>, RepoError> {
        let mut tx = pool.begin().await?;
        lock_kind(&mut tx, kind).await?;
        let Some(current) = find_in(&mut tx, kind, id).await? else {
            return Ok(None);
        };

        let is_active = input.is_active.unwrap_or(current.is_active);
        if input.is_default == Some(true) && !is_active {
            return Err(inactive_default().into());
        }
        let keep_default = is_active && input.is_default != Some(false) && current.is_default;

        let query = format!(
            "UPDATE lookup_values SET \
                name = COALESCE($3, name), \
                code = COALESCE($4, code), \
                description = COALESCE($5, description), \
                sort_order = COALESCE($6, sort_order), \
                metadata = COALESCE($7, metadata), \
                is_active = $8, \
                is_default = $9 \
             WHERE kind = $1 AND id = $2 \
             RETURNING {COLUMNS}"
        );
        let mut value = sqlx::query_as::<_, LookupValue>(&query)
            .bind(kind.as_str())
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.code)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(&input.metadata)
            .bind(is_active)
            .bind(keep_default)
            .fetch_one(&mut *tx)
            .await?;

        if input.is_default == Some(true) && !value.is_default {
            value = make_default(&mut tx, kind, id).await?;
        }

        tx.commit().await?;
        Ok(Some(value))
    }

    /// Make `id` the only default of its kind.
    pub async fn set_default(
        pool: &PgPool,
        kind: LookupKind,
        id: DbId,
    ) -> Result<LookupValue, RepoError> {
        let mut tx = pool.begin().await?;
        lock_kind(&mut tx, kind).await?;
        let current = find_in(&mut tx, kind, id).await?.ok_or(CoreError::NotFound {
            entity: kind.entity_name(),
            id,
        })?;
        if !current.is_active {
            return Err(inactive_default().into());
        }

        let value = make_default(&mut tx, kind, id).await?;
        tx.commit().await?;
        Ok(value)
    }

    /// Delete a value. Student references to it are set to NULL.
    pub async fn delete(pool: &PgPool, kind: LookupKind, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lookup_values WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn inactive_default() -> CoreError {
    CoreError::Validation("An inactive value cannot be the default".to_string())
}

/// Serialise default-moving writes on `kind` until the transaction ends.
async fn lock_kind(tx: &mut Transaction<'_, Postgres>, kind: LookupKind) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('lookup_values:' || $1))")
        .bind(kind.as_str())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn find_in(
    tx: &mut Transaction<'_, Postgres>,
    kind: LookupKind,
    id: DbId,
) -> Result<Option<LookupValue>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM lookup_values WHERE kind = $1 AND id = $2");
    sqlx::query_as::<_, LookupValue>(&query)
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

/// Clear the kind's current default, then flag `id`.
///
/// The clear runs first so the partial unique index never sees two defaults.
async fn make_default(
    tx: &mut Transaction<'_, Postgres>,
    kind: LookupKind,
    id: DbId,
) -> Result<LookupValue, sqlx::Error> {
    sqlx::query(
        "UPDATE lookup_values SET is_default = FALSE \
         WHERE kind = $1 AND is_default AND id <> $2",
    )
    .bind(kind.as_str())
    .bind(id)
    .execute(&mut **tx)
    .await?;

    let query = format!(
        "UPDATE lookup_values SET is_default = TRUE WHERE kind = $1 AND id = $2 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, LookupValue>(&query)
        .bind(kind.as_str())
        .bind(id)
        .fetch_one(&mut **tx)
        .await
}
