//! Connection configuration.

use crate::PgMigratorError;

/// Environment variable holding the PostgreSQL connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Picks the connection string to use.
///
/// An explicit non-empty `url` wins; otherwise [`DATABASE_URL_ENV`] is read.
/// An unset or empty value is a configuration error.
pub fn resolve_database_url(url: Option<String>) -> Result<String, PgMigratorError> {
    url.filter(|url| !url.is_empty())
        .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
        .filter(|url| !url.is_empty())
        .ok_or(PgMigratorError::MissingDatabaseUrl)
}
