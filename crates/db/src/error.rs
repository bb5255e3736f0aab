use admissions_core::error::CoreError;

/// Error returned by repository workflows that check domain rules inside a
/// transaction (conversion, guarded updates, default toggling).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A domain rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database failed. The transaction was rolled back.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
