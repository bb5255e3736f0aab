//! Repository for the `id_sequences` counter table.

use admissions_core::sequence::format_sequence_id;
use sqlx::{PgPool, Postgres, Transaction};

/// Allocates human-readable codes (`LEAD-0001`, `STU-0001`, ...).
pub struct SequenceRepo;

impl SequenceRepo {
    /// Increment the counter for `prefix` and return the new value.
    ///
    /// Runs inside the caller's transaction. The upsert locks the counter
    /// row until commit, so concurrent creators get distinct, increasing
    /// values and a rollback gives the value back.
    pub async fn next_value(
        tx: &mut Transaction<'_, Postgres>,
        prefix: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO id_sequences (prefix, last_value) VALUES ($1, 1) \
             ON CONFLICT (prefix) DO UPDATE SET last_value = id_sequences.last_value + 1 \
             RETURNING last_value",
        )
        .bind(prefix)
        .fetch_one(&mut **tx)
        .await
    }

    /// Allocate the next formatted code for `prefix`.
    pub async fn next_code(
        tx: &mut Transaction<'_, Postgres>,
        prefix: &str,
    ) -> Result<String, sqlx::Error> {
        let value = Self::next_value(tx, prefix).await?;
        Ok(format_sequence_id(prefix, value))
    }

    /// Last allocated value, or `None` if the prefix was never used.
    pub async fn current_value(pool: &PgPool, prefix: &str) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT last_value FROM id_sequences WHERE prefix = $1")
            .bind(prefix)
            .fetch_optional(pool)
            .await
    }
}
