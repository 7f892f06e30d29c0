//! PostgreSQL implementation of the migration backend.

use async_trait::async_trait;
use pgmig_core::{AppliedMigration, MigrationBackend};
use sqlx::{Connection, Executor, PgConnection, Row};
use std::collections::HashSet;

/// A [`MigrationBackend`] over a single PostgreSQL connection.
///
/// Migration bodies are sent as bare `&str` without arguments, which sqlx
/// runs over the simple query protocol, so files may contain several
/// statements. Outside of an explicit transaction
/// every statement commits on its own, which is what autocommit mode relies
/// on; there is no session setting to switch back afterwards.
#[derive(Debug)]
pub struct PgMigrationBackend {
    conn: PgConnection,
}

impl PgMigrationBackend {
    /// Opens the connection used for the whole run.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        log::debug!("Connecting to the migration database");
        let conn = PgConnection::connect(database_url).await?;
        Ok(Self::new(conn))
    }

    /// Wraps an already open connection.
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Gracefully closes the connection.
    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

#[async_trait]
impl MigrationBackend for PgMigrationBackend {
    type Error = sqlx::Error;

    async fn ensure_tracking_table(&mut self) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applied_migrations (
                filename VARCHAR PRIMARY KEY,
                applied_at TIMESTAMP NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut self.conn)
        .await?;

        Ok(())
    }

    async fn load_applied_set(&mut self) -> Result<HashSet<String>, Self::Error> {
        let filenames: Vec<String> = sqlx::query_scalar("SELECT filename FROM applied_migrations")
            .fetch_all(&mut self.conn)
            .await?;

        Ok(filenames.into_iter().collect())
    }

    async fn applied(&mut self) -> Result<Vec<AppliedMigration>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT filename, applied_at
            FROM applied_migrations
            ORDER BY applied_at ASC, filename ASC
            "#,
        )
        .fetch_all(&mut self.conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AppliedMigration {
                filename: row.get("filename"),
                applied_at: row.get("applied_at"),
            })
            .collect())
    }

    async fn execute_autocommit(&mut self, statement: &str) -> Result<(), Self::Error> {
        (&mut self.conn).execute(statement).await?;
        Ok(())
    }

    async fn execute_verbatim(&mut self, sql: &str) -> Result<(), Self::Error> {
        (&mut self.conn).execute(sql).await?;
        Ok(())
    }

    async fn execute_wrapped(&mut self, sql: &str) -> Result<(), Self::Error> {
        // Dropping an uncommitted transaction rolls it back.
        let mut tx = self.conn.begin().await?;
        (&mut *tx).execute(sql).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn record_applied(&mut self, filename: &str) -> Result<(), Self::Error> {
        let mut tx = self.conn.begin().await?;
        sqlx::query("INSERT INTO applied_migrations (filename) VALUES ($1)")
            .bind(filename)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), Self::Error> {
        // Outside of a transaction PostgreSQL only warns, so this is safe after
        // a wrapped transaction was already released.
        (&mut self.conn).execute("ROLLBACK").await?;
        Ok(())
    }
}
