use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use shopkeep_api::{config, db, migrator::Migrator};

/// Schema management for the shopkeep database
#[derive(Debug, Parser)]
#[command(name = "migration", version, about)]
struct Cli {
    /// Database URL; falls back to `DATABASE_URL`, then the application configuration
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        /// Number of migrations to apply
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back
        #[arg(short, long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and reapply all migrations
    Fresh,
    /// Show applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let database_url = match cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
    {
        Some(url) => url,
        None => {
            config::load_config()
                .context("no --database-url given and configuration could not be loaded")?
                .database_url
        }
    };
    config::init_tracing("info", false);

    info!("Connecting to database");
    let conn = db::establish_connection(&database_url)
        .await
        .context("failed to connect to the database")?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            Migrator::up(&conn, steps).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&conn, Some(steps)).await?;
            info!("Rolled back {} migration(s)", steps);
        }
        Command::Fresh => {
            Migrator::fresh(&conn).await?;
            info!("Schema recreated");
        }
        Command::Status => Migrator::status(&conn).await?,
    }

    Ok(())
}
