//! The seam between the migration engine and a database.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

/// Name of the table recording applied migrations.
///
/// Its shape (`filename` primary key, `applied_at` timestamp) is a durable
/// contract shared with every earlier run against the same database.
pub const TRACKING_TABLE: &str = "applied_migrations";

/// A row of the tracking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    /// The migration filename.
    pub filename: String,
    /// When the migration was recorded.
    pub applied_at: NaiveDateTime,
}

/// Operations the [`Migrator`](crate::Migrator) needs from a database.
///
/// A backend owns a single connection and is driven sequentially.
#[async_trait]
pub trait MigrationBackend: Send {
    /// The error type returned by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates the tracking table if it does not exist yet.
    async fn ensure_tracking_table(&mut self) -> Result<(), Self::Error>;

    /// Returns the filenames already recorded as applied.
    async fn load_applied_set(&mut self) -> Result<HashSet<String>, Self::Error>;

    /// Returns the tracking records, oldest first.
    async fn applied(&mut self) -> Result<Vec<AppliedMigration>, Self::Error>;

    /// Runs a single statement outside of any transaction.
    async fn execute_autocommit(&mut self, statement: &str) -> Result<(), Self::Error>;

    /// Runs a script that manages its own transaction, as-is.
    async fn execute_verbatim(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Runs a script inside a transaction opened and committed by the backend.
    ///
    /// If the script fails the transaction must not be committed.
    async fn execute_wrapped(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Inserts the tracking record for `filename` in its own transaction.
    async fn record_applied(&mut self, filename: &str) -> Result<(), Self::Error>;

    /// Rolls back whatever transaction is currently open on the connection.
    async fn rollback(&mut self) -> Result<(), Self::Error>;
}
