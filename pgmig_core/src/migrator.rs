//! The migration driver.

use crate::backend::{AppliedMigration, MigrationBackend};
use crate::config::MigratorConfig;
use crate::error::MigrationError;
use crate::file::{Discovery, MigrationFile, discover_migration_files};
use crate::mode::{ExecutionMode, split_statements};
use crate::order::{compute_order, resolve_table};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Migrations applied by this run, in application order.
    pub applied: Vec<String>,
    /// Migrations skipped because they were already recorded.
    pub skipped: Vec<String>,
}

/// One entry of a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMigration {
    /// The migration filename.
    pub filename: String,
    /// How the migration would be executed.
    pub mode: ExecutionMode,
    /// Whether the tracking table already lists it.
    pub applied: bool,
    /// Migrations this one was inferred to depend on.
    pub depends_on: Vec<String>,
}

/// Applies a directory of SQL migrations through a [`MigrationBackend`].
///
/// Each run goes through the same steps: ensure the tracking table exists,
/// load the applied set, discover and order the files, then apply every
/// unapplied file in order. The first failure rolls back, halts the run and
/// is returned to the caller; nothing after it is attempted.
///
/// ```rust,ignore
/// use pgmig_core::{Migrator, MigratorConfig};
///
/// let mut migrator = Migrator::new(backend, MigratorConfig::from_env());
/// let report = migrator.run().await?;
/// println!("Applied {} migrations", report.applied.len());
/// ```
#[derive(Debug)]
pub struct Migrator<B> {
    backend: B,
    config: MigratorConfig,
}

impl<B> Migrator<B>
where
    B: MigrationBackend,
{
    /// Creates a migrator over `backend`.
    pub fn new(backend: B, config: MigratorConfig) -> Self {
        Self { backend, config }
    }

    /// Gives the backend back, e.g. to close its connection.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Creates the tracking table if absent. Safe to call on every run.
    pub async fn ensure_tracking_table(&mut self) -> Result<(), MigrationError<B::Error>> {
        self.backend
            .ensure_tracking_table()
            .await
            .map_err(MigrationError::Database)
    }

    /// Returns the filenames already recorded as applied.
    pub async fn load_applied_set(&mut self) -> Result<HashSet<String>, MigrationError<B::Error>> {
        self.backend
            .load_applied_set()
            .await
            .map_err(MigrationError::Database)
    }

    /// Returns the tracking records, oldest first.
    pub async fn applied(&mut self) -> Result<Vec<AppliedMigration>, MigrationError<B::Error>> {
        self.ensure_tracking_table().await?;
        self.backend.applied().await.map_err(MigrationError::Database)
    }

    /// Lists the configured directory.
    pub fn discover(&self) -> Result<Discovery, MigrationError<B::Error>> {
        discover_migration_files(&self.config.migrations_dir).map_err(|e| MigrationError::Io {
            path: e.path,
            source: e.source,
        })
    }

    /// Applies a single file in the mode its content calls for.
    ///
    /// Does not record the migration; see [`Migrator::process_all`].
    pub async fn apply_one(&mut self, file: &MigrationFile) -> Result<ExecutionMode, B::Error> {
        let mode = ExecutionMode::detect(file.content());
        match mode {
            ExecutionMode::Autocommit => {
                log::debug!("Executing in autocommit mode: {}", file.name());
                for statement in split_statements(file.content()) {
                    log::debug!("{}: {}", file.name(), statement);
                    self.backend.execute_autocommit(statement).await?;
                }
            }
            ExecutionMode::SelfManaged => {
                log::debug!("Migration has own transaction control: {}", file.name());
                self.backend.execute_verbatim(file.content()).await?;
            }
            ExecutionMode::Wrapped => {
                log::debug!("Wrapping in transaction: {}", file.name());
                self.backend.execute_wrapped(file.content()).await?;
            }
        }
        Ok(mode)
    }

    /// Applies every file of `files` not in `applied`, in the given order.
    ///
    /// Each successful file is recorded before moving on. On the first
    /// failure a rollback is attempted (its own failure is only logged) and
    /// the original error is returned without touching the remaining files.
    /// Statements already executed by an autocommit-mode file stay committed.
    pub async fn process_all(
        &mut self,
        files: &[MigrationFile],
        applied: &HashSet<String>,
    ) -> Result<RunReport, MigrationError<B::Error>> {
        let mut report = RunReport::default();

        for file in files {
            let filename = file.name();

            if applied.contains(filename) {
                log::info!("Skipping (already applied): {}", filename);
                report.skipped.push(filename.to_owned());
                continue;
            }

            log::info!("Applying: {}", filename);

            let outcome = match self.apply_one(file).await {
                Ok(mode) => self
                    .backend
                    .record_applied(filename)
                    .await
                    .map(|()| mode)
                    .map_err(|source| MigrationError::RecordFailed {
                        filename: filename.to_owned(),
                        source,
                    }),
                Err(source) => Err(MigrationError::MigrationFailed {
                    filename: filename.to_owned(),
                    source,
                }),
            };

            match outcome {
                Ok(mode) => {
                    log::info!("Applied successfully: {} ({})", filename, mode);
                    report.applied.push(filename.to_owned());
                }
                Err(err) => {
                    log::error!("{}", err);

                    if ExecutionMode::detect(file.content()) == ExecutionMode::Autocommit {
                        log::warn!(
                            "{} ran in autocommit mode; statements executed before the failure remain committed",
                            filename
                        );
                    }

                    match self.backend.rollback().await {
                        Ok(()) => log::info!("Rolled back: {}", filename),
                        Err(rollback_err) => log::error!("Rollback failed: {}", rollback_err),
                    }

                    log::error!("Stopping migrations due to failure");
                    return Err(err);
                }
            }
        }

        Ok(report)
    }

    /// Runs all pending migrations from the configured directory.
    ///
    /// A missing directory or an empty one is a successful no-op.
    pub async fn run(&mut self) -> Result<RunReport, MigrationError<B::Error>> {
        self.ensure_tracking_table().await?;
        let applied = self.load_applied_set().await?;

        let files = self.discover()?.into_files();
        if files.is_empty() {
            return Ok(RunReport::default());
        }

        log::info!("Processing {} migration(s)", files.len());
        let ordered = compute_order(files);
        let report = self.process_all(&ordered, &applied).await?;

        log::info!(
            "Migration process completed: {} applied, {} skipped",
            report.applied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Computes what [`Migrator::run`] would do, without executing anything.
    ///
    /// The tracking table is still created if missing, so the applied set can
    /// be read.
    pub async fn plan(&mut self) -> Result<Vec<PlannedMigration>, MigrationError<B::Error>> {
        self.ensure_tracking_table().await?;
        let applied = self.load_applied_set().await?;

        let mut sorted = self.discover()?.into_files();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));

        let plan = compute_order(sorted.clone())
            .into_iter()
            .map(|file| {
                let depends_on = file
                    .referenced_tables()
                    .iter()
                    .filter_map(|table| resolve_table(&sorted, table))
                    .map(|dependency| dependency.name().to_owned())
                    .filter(|dependency| dependency != file.name())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                PlannedMigration {
                    applied: applied.contains(file.name()),
                    mode: ExecutionMode::detect(file.content()),
                    filename: file.name().to_owned(),
                    depends_on,
                }
            })
            .collect();

        Ok(plan)
    }

    /// Returns the migrations not yet applied, in application order.
    pub async fn pending(&mut self) -> Result<Vec<MigrationFile>, MigrationError<B::Error>> {
        self.ensure_tracking_table().await?;
        let applied = self.load_applied_set().await?;

        Ok(compute_order(self.discover()?.into_files())
            .into_iter()
            .filter(|file| !applied.contains(file.name()))
            .collect())
    }
}
