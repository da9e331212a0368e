//! Applies or reverts the tracker schema.
//!
//! ```text
//! migrate up     # apply all pending migrations
//! migrate down   # revert the most recent one
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use coach_api::config::resolve_database_url;
use coach_api::db::{create_pool, revert_latest, run_migrations};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    Up,
    Down,
}

#[derive(Parser, Debug)]
#[command(name = "migrate", about = "Apply or revert the tracker database schema")]
struct Cli {
    #[arg(value_enum, default_value = "up", ignore_case = true)]
    action: Action,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = resolve_database_url(|key| {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
    .context("DATABASE_URL (or POSTGRES_HOST) must be set")?;

    let pool = create_pool(&database_url).await?;
    match cli.action {
        Action::Up => {
            run_migrations(&pool).await?;
            info!("migrations up: done");
        }
        Action::Down => {
            match revert_latest(&pool).await? {
                Some(version) => info!("migrations down: reverted {version}"),
                None => info!("migrations down: nothing to revert"),
            }
        }
    }
    Ok(())
}
