//! Errors raised while applying migrations.

use std::path::PathBuf;

/// Errors that can occur during a migration run.
///
/// `BE` is the backend's own error type, kept intact so callers can inspect
/// the underlying database failure.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError<BE>
where
    BE: std::error::Error + 'static,
{
    /// The backend failed outside of a specific migration (tracking table,
    /// reading the applied set, connectivity).
    #[error("Database error: {0}")]
    Database(#[source] BE),

    /// The migrations directory or one of its files could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A migration's SQL failed to execute.
    #[error("Failed to apply {filename}: {source}")]
    MigrationFailed {
        /// The migration that failed.
        filename: String,
        /// The database error.
        source: BE,
    },

    /// A migration ran but its tracking record could not be written.
    #[error("Failed to record {filename}: {source}")]
    RecordFailed {
        /// The migration whose record failed.
        filename: String,
        /// The database error.
        source: BE,
    },
}

impl<BE> MigrationError<BE>
where
    BE: std::error::Error + 'static,
{
    /// The migration this error is about, if it concerns a single file.
    pub fn filename(&self) -> Option<&str> {
        match self {
            MigrationError::MigrationFailed { filename, .. }
            | MigrationError::RecordFailed { filename, .. } => Some(filename),
            MigrationError::Database(_) | MigrationError::Io { .. } => None,
        }
    }
}
