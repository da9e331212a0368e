use anyhow::{Context, Result};
use sqlx::migrate::{Migrate, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Migrations under `apps/api/migrations`, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    info!("Migrations applied");
    Ok(())
}

/// Reverts the most recently applied migration. Returns its version, or
/// `None` when nothing has been applied.
pub async fn revert_latest(pool: &PgPool) -> Result<Option<i64>> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied = conn.list_applied_migrations().await?;
    drop(conn);

    let Some(latest) = applied.iter().map(|m| m.version).max() else {
        info!("No applied migrations to revert");
        return Ok(None);
    };
    let previous = applied
        .iter()
        .map(|m| m.version)
        .filter(|v| *v < latest)
        .max()
        .unwrap_or(0);

    MIGRATOR
        .undo(pool, previous)
        .await
        .with_context(|| format!("failed to revert migration {latest}"))?;
    info!("Reverted migration {latest}");
    Ok(Some(latest))
}
