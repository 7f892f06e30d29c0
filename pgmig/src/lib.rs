//! # pgmig
//!
//! Applies a directory of ordered SQL migrations to PostgreSQL, exactly once
//! each, in an order that creates referenced tables first.
//!
//! The engine lives in `pgmig_core` and is re-exported at the crate root.
//! Backends are enabled through features:
//!
//! - `postgres` (default): [`postgres`], a `sqlx` backend over a single connection.
//! - `in-memory`: [`mem`], a scripted backend for tests.

#![deny(missing_docs)]

pub use pgmig_core::*;

#[cfg(feature = "postgres")]
/// The PostgreSQL backend.
pub mod postgres {
    //! Contains the PostgreSQL backend and the `migrate` entry point.
    pub use pgmig_pg::*;
}

#[cfg(feature = "in-memory")]
/// The in-memory backend.
pub mod mem {
    //! Contains the in-memory backend used for testing.
    pub use pgmig_mem::*;
}

pub mod prelude {
    //! The prelude module for the `pgmig` crate.
    pub use pgmig_core::prelude::*;

    #[cfg(feature = "in-memory")]
    pub use super::mem::InMemoryBackend;
    #[cfg(feature = "postgres")]
    pub use super::postgres::{PgMigrationBackend, PgMigrator, PgMigratorError};
}
