//! # pgmig memory backend
//!
//! An in-memory [`MigrationBackend`](pgmig_core::MigrationBackend), primarily
//! for testing the migration engine without a database.
//!
//! ```ignore
//! use pgmig_core::{Migrator, MigratorConfig};
//! use pgmig_mem::InMemoryBackend;
//!
//! let backend = InMemoryBackend::new().fail_on("DROP TABLE users");
//! let mut migrator = Migrator::new(backend.clone(), MigratorConfig::new("migrations"));
//!
//! let err = migrator.run().await.unwrap_err();
//! assert_eq!(backend.rollbacks().await, 1);
//! ```

#![deny(missing_docs)]

mod backend;

pub use backend::*;
