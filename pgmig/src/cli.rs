//! CLI argument definitions using clap derive API

use clap::Parser;
use pgmig::postgres::DATABASE_URL_ENV;
use pgmig::{DEFAULT_MIGRATIONS_DIR, MIGRATIONS_DIR_ENV};
use std::path::PathBuf;

/// pgmig - apply ordered SQL migrations to PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "pgmig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the `.sql` migration files
    #[arg(short, long, env = MIGRATIONS_DIR_ENV, default_value = DEFAULT_MIGRATIONS_DIR)]
    pub migrations_dir: PathBuf,

    /// PostgreSQL connection string
    #[arg(long, env = DATABASE_URL_ENV, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Show what would be applied, in order, without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report (or plan) as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "pgmig",
            "--migrations-dir",
            "db/migrations",
            "--database-url",
            "postgres://localhost/app",
            "--dry-run",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.migrations_dir, PathBuf::from("db/migrations"));
        assert_eq!(cli.database_url.as_deref(), Some("postgres://localhost/app"));
        assert!(cli.dry_run);
        assert!(cli.json);
    }

    #[test]
    fn short_migrations_dir_flag() {
        let cli = Cli::try_parse_from(["pgmig", "-m", "sql"]).unwrap();

        assert_eq!(cli.migrations_dir, PathBuf::from("sql"));
        assert!(!cli.dry_run);
        assert!(!cli.json);
    }
}
