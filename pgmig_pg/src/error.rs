use pgmig_core::MigrationError;

/// Errors returned by [`migrate`](crate::migrate) and friends.
#[derive(Debug, thiserror::Error)]
pub enum PgMigratorError {
    /// No connection string was configured.
    #[error("DATABASE_URL environment variable is not set")]
    MissingDatabaseUrl,

    /// The database could not be reached.
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// The run itself failed.
    #[error(transparent)]
    Migration(#[from] MigrationError<sqlx::Error>),
}
