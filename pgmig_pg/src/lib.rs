//! # pgmig postgres backend
//!
//! Applies a directory of SQL migrations to PostgreSQL over a single
//! connection, recording applied files in the `applied_migrations` table.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pgmig_core::MigratorConfig;
//!
//! let url = pgmig_pg::resolve_database_url(None)?;
//! let report = pgmig_pg::migrate(&url, MigratorConfig::from_env()).await?;
//! println!("Applied {} migrations", report.applied.len());
//! ```

#![deny(missing_docs)]

mod backend;
mod config;
mod error;

pub use backend::PgMigrationBackend;
pub use config::{DATABASE_URL_ENV, resolve_database_url};
pub use error::PgMigratorError;

use pgmig_core::{Migrator, MigratorConfig, PlannedMigration, RunReport};

/// A [`Migrator`] driving a PostgreSQL connection.
pub type PgMigrator = Migrator<PgMigrationBackend>;

/// Connects and builds a [`PgMigrator`].
pub async fn connect(
    database_url: &str,
    config: MigratorConfig,
) -> Result<PgMigrator, PgMigratorError> {
    let backend = PgMigrationBackend::connect(database_url)
        .await
        .map_err(PgMigratorError::Connection)?;
    Ok(Migrator::new(backend, config))
}

/// Runs every pending migration, then closes the connection.
///
/// The connection is closed whether the run succeeds or fails.
pub async fn migrate(
    database_url: &str,
    config: MigratorConfig,
) -> Result<RunReport, PgMigratorError> {
    let mut migrator = connect(database_url, config).await?;
    let result = migrator.run().await;
    close(migrator).await;
    Ok(result?)
}

/// Computes the migration plan without executing anything, then closes the
/// connection.
pub async fn plan(
    database_url: &str,
    config: MigratorConfig,
) -> Result<Vec<PlannedMigration>, PgMigratorError> {
    let mut migrator = connect(database_url, config).await?;
    let result = migrator.plan().await;
    close(migrator).await;
    Ok(result?)
}

async fn close(migrator: PgMigrator) {
    if let Err(e) = migrator.into_backend().close().await {
        log::warn!("Failed to close database connection: {}", e);
    }
}
