//! # pgmig core
//!
//! Backend-agnostic engine for applying a directory of ordered SQL migrations.
//!
//! Files are discovered fresh on every run, ordered so that tables referenced
//! through `REFERENCES` clauses are created first, and applied one at a time
//! through a [`MigrationBackend`]. Successful files are recorded in the
//! [`TRACKING_TABLE`]; the first failure halts the whole run.

#![deny(missing_docs)]

mod backend;
mod config;
mod error;
mod file;
mod migrator;
mod mode;
mod order;

pub use backend::{AppliedMigration, MigrationBackend, TRACKING_TABLE};
pub use config::{DEFAULT_MIGRATIONS_DIR, MIGRATIONS_DIR_ENV, MigratorConfig};
pub use error::MigrationError;
pub use file::{
    Discovery, DiscoveryError, MIGRATION_EXTENSION, MigrationFile, discover_migration_files,
};
pub use migrator::{Migrator, PlannedMigration, RunReport};
pub use mode::{
    AUTOCOMMIT_STATEMENTS, ExecutionMode, has_transaction_block, requires_autocommit,
    split_statements,
};
pub use order::{compute_order, extract_referenced_tables, resolve_table};

pub mod prelude {
    //! The prelude module for the `pgmig_core` crate.
    pub use super::{
        ExecutionMode, MigrationBackend, MigrationError, MigrationFile, Migrator, MigratorConfig,
        RunReport,
    };
}
