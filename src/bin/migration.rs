use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use printhub_api::migrator::Migrator;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Manage the PrintHub database schema", version)]
struct Cli {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back the most recent migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Show which migrations have been applied
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let mut options = ConnectOptions::new(cli.database_url);
    options
        .max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("failed to connect to database")?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => {
            Migrator::up(&db, None).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Command::Status => Migrator::status(&db).await?,
        Command::Fresh => {
            Migrator::fresh(&db).await?;
            info!("Database recreated");
        }
    }

    Ok(())
}
