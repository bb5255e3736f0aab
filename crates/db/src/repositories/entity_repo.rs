//! Existence checks for polymorphic entity references.

use admissions_core::entity::EntityRef;
use sqlx::PgExecutor;

pub struct EntityRepo;

impl EntityRepo {
    /// Whether the referenced lead, student, or application exists.
    pub async fn exists<'e, E>(executor: E, entity: EntityRef) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        // The table name comes from a closed enum, never from input.
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            entity.kind.table()
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(entity.id)
            .fetch_one(executor)
            .await
    }
}
