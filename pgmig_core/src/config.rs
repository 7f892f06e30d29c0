//! Runner configuration.

use std::path::PathBuf;

/// Environment variable naming the migrations directory.
pub const MIGRATIONS_DIR_ENV: &str = "MIGRATIONS_DIR";

/// Directory used when [`MIGRATIONS_DIR_ENV`] is unset.
pub const DEFAULT_MIGRATIONS_DIR: &str = "/usr/src/app/migrations";

/// Configuration handed to a [`Migrator`](crate::Migrator) at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Directory scanned (non-recursively) for `.sql` files.
    pub migrations_dir: PathBuf,
}

impl MigratorConfig {
    /// Creates a configuration pointing at `migrations_dir`.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        std::env::var_os(MIGRATIONS_DIR_ENV)
            .map(Self::new)
            .unwrap_or_default()
    }
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIGRATIONS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_points_at_container_path() {
        assert_eq!(
            MigratorConfig::default().migrations_dir,
            PathBuf::from("/usr/src/app/migrations")
        );
    }

    #[test]
    fn new_accepts_any_path_like() {
        let config = MigratorConfig::new("db/migrations");
        assert_eq!(config.migrations_dir, PathBuf::from("db/migrations"));
    }

    #[test]
    #[serial]
    fn from_env_reads_migrations_dir() {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::set_var(MIGRATIONS_DIR_ENV, "/srv/migrations") };

        let config = MigratorConfig::from_env();

        unsafe { std::env::remove_var(MIGRATIONS_DIR_ENV) };
        assert_eq!(config.migrations_dir, PathBuf::from("/srv/migrations"));
    }

    #[test]
    #[serial]
    fn from_env_falls_back_to_default() {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::remove_var(MIGRATIONS_DIR_ENV) };

        assert_eq!(MigratorConfig::from_env(), MigratorConfig::default());
    }
}
