use ocg_core::error::CoreError;

/// Error returned by repository operations that validate before writing.
///
/// Plain CRUD functions return `sqlx::Error` directly; transactional
/// operations that enforce domain rules return this instead so a rule
/// violation and a store failure stay distinguishable.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A domain rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database failed or rejected a statement (including constraint violations).
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
