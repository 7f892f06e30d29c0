use async_trait::async_trait;
use chrono::Utc;
use pgmig_core::{AppliedMigration, ExecutionMode, MigrationBackend};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A piece of SQL the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// The mode the SQL was executed in.
    pub mode: ExecutionMode,
    /// The SQL text, a single statement in autocommit mode.
    pub sql: String,
}

#[derive(Debug, Default)]
struct BackendData {
    tracking_table: bool,
    records: Vec<AppliedMigration>,
    executions: Vec<Execution>,
    rollbacks: usize,
}

/// An in-memory migration backend.
///
/// Executed SQL is not interpreted, only remembered. Failures are scripted:
/// any SQL containing one of the [`InMemoryBackend::fail_on`] patterns is
/// rejected. Clones share the same underlying data, so one clone can be handed
/// to a [`Migrator`](pgmig_core::Migrator) and another kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackend {
    data: Arc<Mutex<BackendData>>,
    failures: Vec<String>,
    fail_rollback: bool,
    unavailable: bool,
}

/// Errors returned by the [`InMemoryBackend`].
#[derive(Debug, thiserror::Error)]
pub enum InMemoryBackendError {
    /// The SQL matched a scripted failure.
    #[error("Statement failed: {0}")]
    StatementFailed(String),
    /// A tracking record for this filename already exists.
    #[error("Duplicate key value violates unique constraint: filename={0}")]
    DuplicateRecord(String),
    /// The tracking table was used before being created.
    #[error("Relation \"applied_migrations\" does not exist")]
    MissingTrackingTable,
    /// The scripted rollback failure.
    #[error("Rollback failed")]
    RollbackFailed,
    /// The backend simulates an unreachable database.
    #[error("Connection refused")]
    Unavailable,
}

impl InMemoryBackend {
    /// Creates an empty backend with no tracking table.
    pub fn new() -> Self {
        log::debug!("Creating a new InMemoryBackend");
        Self::default()
    }

    /// Rejects any SQL containing `pattern`.
    pub fn fail_on(mut self, pattern: impl Into<String>) -> Self {
        self.failures.push(pattern.into());
        self
    }

    /// Makes every rollback fail.
    pub fn fail_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    /// Makes every operation fail as if the database were unreachable.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Creates the tracking table and records `filename` as applied.
    pub async fn seed_applied(&self, filename: impl Into<String>) {
        let mut data = self.data.lock().await;
        data.tracking_table = true;
        data.records.push(AppliedMigration {
            filename: filename.into(),
            applied_at: Utc::now().naive_utc(),
        });
    }

    /// Whether the tracking table exists.
    pub async fn has_tracking_table(&self) -> bool {
        self.data.lock().await.tracking_table
    }

    /// Tracking records, in insertion order.
    pub async fn records(&self) -> Vec<AppliedMigration> {
        self.data.lock().await.records.clone()
    }

    /// Recorded filenames, in insertion order.
    pub async fn recorded_filenames(&self) -> Vec<String> {
        self.data
            .lock()
            .await
            .records
            .iter()
            .map(|record| record.filename.clone())
            .collect()
    }

    /// Every piece of SQL that executed successfully, in order.
    pub async fn executions(&self) -> Vec<Execution> {
        self.data.lock().await.executions.clone()
    }

    /// How many rollbacks were requested (including failed ones).
    pub async fn rollbacks(&self) -> usize {
        self.data.lock().await.rollbacks
    }

    fn check_available(&self) -> Result<(), InMemoryBackendError> {
        if self.unavailable {
            return Err(InMemoryBackendError::Unavailable);
        }
        Ok(())
    }

    fn check_sql(&self, sql: &str) -> Result<(), InMemoryBackendError> {
        match self.failures.iter().find(|pattern| sql.contains(pattern.as_str())) {
            Some(pattern) => {
                log::debug!("Scripted failure on pattern: {}", pattern);
                Err(InMemoryBackendError::StatementFailed(pattern.clone()))
            }
            None => Ok(()),
        }
    }

    async fn execute(&self, mode: ExecutionMode, sql: &str) -> Result<(), InMemoryBackendError> {
        self.check_available()?;
        self.check_sql(sql)?;
        self.data.lock().await.executions.push(Execution {
            mode,
            sql: sql.to_owned(),
        });
        Ok(())
    }
}

#[async_trait]
impl MigrationBackend for InMemoryBackend {
    type Error = InMemoryBackendError;

    async fn ensure_tracking_table(&mut self) -> Result<(), Self::Error> {
        self.check_available()?;
        self.data.lock().await.tracking_table = true;
        Ok(())
    }

    async fn load_applied_set(&mut self) -> Result<HashSet<String>, Self::Error> {
        self.check_available()?;
        let data = self.data.lock().await;
        if !data.tracking_table {
            return Err(InMemoryBackendError::MissingTrackingTable);
        }
        Ok(data
            .records
            .iter()
            .map(|record| record.filename.clone())
            .collect())
    }

    async fn applied(&mut self) -> Result<Vec<AppliedMigration>, Self::Error> {
        self.check_available()?;
        let data = self.data.lock().await;
        if !data.tracking_table {
            return Err(InMemoryBackendError::MissingTrackingTable);
        }
        let mut records = data.records.clone();
        records.sort_by(|a, b| {
            a.applied_at
                .cmp(&b.applied_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(records)
    }

    async fn execute_autocommit(&mut self, statement: &str) -> Result<(), Self::Error> {
        self.execute(ExecutionMode::Autocommit, statement).await
    }

    async fn execute_verbatim(&mut self, sql: &str) -> Result<(), Self::Error> {
        self.execute(ExecutionMode::SelfManaged, sql).await
    }

    async fn execute_wrapped(&mut self, sql: &str) -> Result<(), Self::Error> {
        self.execute(ExecutionMode::Wrapped, sql).await
    }

    async fn record_applied(&mut self, filename: &str) -> Result<(), Self::Error> {
        self.check_available()?;
        let mut data = self.data.lock().await;
        if !data.tracking_table {
            return Err(InMemoryBackendError::MissingTrackingTable);
        }
        if data.records.iter().any(|record| record.filename == filename) {
            return Err(InMemoryBackendError::DuplicateRecord(filename.to_owned()));
        }
        data.records.push(AppliedMigration {
            filename: filename.to_owned(),
            applied_at: Utc::now().naive_utc(),
        });
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), Self::Error> {
        self.data.lock().await.rollbacks += 1;
        if self.fail_rollback {
            return Err(InMemoryBackendError::RollbackFailed);
        }
        Ok(())
    }
}
