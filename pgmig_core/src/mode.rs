//! How a migration file is executed.

use serde::Serialize;
use std::fmt;

/// Statements PostgreSQL refuses to run inside a transaction block.
pub const AUTOCOMMIT_STATEMENTS: &[&str] = &[
    "CREATE DATABASE",
    "DROP DATABASE",
    "CREATE TABLESPACE",
    "DROP TABLESPACE",
    "ALTER SYSTEM",
];

/// The three mutually exclusive ways of applying a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Each `;`-separated statement runs and commits on its own.
    ///
    /// Statements that succeeded before a failure stay committed.
    Autocommit,
    /// The file carries its own `BEGIN`/`COMMIT` and runs verbatim.
    SelfManaged,
    /// The runner wraps the whole file in a transaction.
    Wrapped,
}

impl ExecutionMode {
    /// Picks the mode for a migration body.
    ///
    /// Autocommit wins over a self-managed transaction, which wins over the
    /// default wrapped mode.
    pub fn detect(sql: &str) -> Self {
        if requires_autocommit(sql) {
            ExecutionMode::Autocommit
        } else if has_transaction_block(sql) {
            ExecutionMode::SelfManaged
        } else {
            ExecutionMode::Wrapped
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionMode::Autocommit => "autocommit",
            ExecutionMode::SelfManaged => "self-managed transaction",
            ExecutionMode::Wrapped => "wrapped transaction",
        };
        f.write_str(label)
    }
}

/// True when `sql` contains a statement that cannot run in a transaction.
pub fn requires_autocommit(sql: &str) -> bool {
    let upper = sql.to_uppercase();
    AUTOCOMMIT_STATEMENTS
        .iter()
        .any(|statement| upper.contains(statement))
}

/// True when `sql` opens its own transaction.
pub fn has_transaction_block(sql: &str) -> bool {
    let upper = sql.trim().to_uppercase();
    upper.starts_with("BEGIN") || upper.contains("BEGIN;") || upper.starts_with("START TRANSACTION")
}

/// Splits a script on `;`, dropping fragments that are blank once trimmed.
///
/// This is a plain textual split: semicolons inside string literals or
/// function bodies are not special-cased.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .collect()
}
