mod cli;

use clap::Parser;
use cli::Cli;
use pgmig::MigratorConfig;
use pgmig::postgres::{PgMigratorError, resolve_database_url};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Migrator(#[from] PgMigratorError),

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting migration process...");
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<(), CliError> {
    let database_url = resolve_database_url(cli.database_url)?;
    let config = MigratorConfig::new(cli.migrations_dir);

    if cli.dry_run {
        let plan = pgmig::postgres::plan(&database_url, config).await?;
        if cli.json {
            print_json(&plan)?;
        } else if plan.is_empty() {
            log::info!("No migrations found");
        } else {
            for (position, step) in plan.iter().enumerate() {
                let status = if step.applied { "applied" } else { "pending" };
                if step.depends_on.is_empty() {
                    log::info!("{:>3}. {} [{}, {}]", position + 1, step.filename, status, step.mode);
                } else {
                    log::info!(
                        "{:>3}. {} [{}, {}] after {}",
                        position + 1,
                        step.filename,
                        status,
                        step.mode,
                        step.depends_on.join(", ")
                    );
                }
            }
        }
        return Ok(());
    }

    let report = pgmig::postgres::migrate(&database_url, config).await?;
    if cli.json {
        print_json(&report)?;
    }
    log::info!("Migration process completed.");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn unserializable_output_is_an_error() {
        let value = BTreeMap::from([((1, 2), "tuple keys are not valid JSON keys")]);

        let err = print_json(&value).unwrap_err();

        assert!(matches!(err, CliError::Output(_)));
    }

    #[test]
    fn report_is_printed() {
        print_json(&pgmig::RunReport::default()).unwrap();
    }
}
