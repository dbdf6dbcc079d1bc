use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habitsync::kv::FileKvStore;
use habitsync::migration::MigrationRunner;
use habitsync::storage::SqliteRepository;
use habitsync_core::storage::DatabaseInitializer;

/// HabitSync - local-first persistence tooling for the habitsync app
#[derive(Parser, Debug)]
#[command(name = "habitsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the durable SQLite database
    #[arg(long, short, default_value = "habitsync.db", env = "HABITSYNC_DB")]
    db: String,

    /// Path to the exported legacy key-value dump (JSON object file)
    #[arg(long, short, default_value = "legacy.json", env = "HABITSYNC_LEGACY")]
    legacy: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the one-time legacy-to-durable migration
    Migrate,
    /// Clear the migration-completion flag in both stores (debug/test)
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let legacy = Arc::new(
        FileKvStore::open(&cli.legacy)
            .await
            .with_context(|| format!("opening legacy dump {}", cli.legacy))?,
    );
    let repository = Arc::new(
        SqliteRepository::open(&cli.db)
            .await
            .with_context(|| format!("opening database {}", cli.db))?,
    );

    // The migration runs before any adapter touches the store, so schema
    // setup happens here rather than behind the adapters' lazy guard.
    repository
        .initialize()
        .await
        .context("initializing database schema")?;

    let runner = MigrationRunner::with_repository(legacy, repository);

    match cli.command {
        Command::Migrate => {
            let result = runner.run().await;
            tracing::info!(
                success = result.success,
                templates = result.templates_count,
                vacation_periods = result.vacation_count,
                profile = result.profile_migrated,
                "migration finished"
            );
            if let Some(error) = &result.error {
                anyhow::bail!("migration could not be marked complete: {error}");
            }
        }
        Command::Reset => {
            runner.reset().await.context("resetting migration flag")?;
            tracing::info!("migration flag cleared in both stores");
        }
    }

    Ok(())
}
