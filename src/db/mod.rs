use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::Path;
use tokio::time::sleep;

use crate::config::Config;

pub mod models;
pub mod queries;

/// Connects to PostgreSQL, retrying `db_connect_attempts` times before giving up.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config.database_url()?;
    let attempts = config.db_connect_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("Database connection established");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    "Connection attempt {} of {} failed: {}. Retrying in {:?}",
                    attempt,
                    attempts,
                    e,
                    config.db_connect_retry()
                );
                sleep(config.db_connect_retry()).await;
            }
            Err(e) => {
                tracing::error!("Failed to establish connection after {} attempts", attempts);
                return Err(e.into());
            }
        }
    }
}

pub async fn run_migrations(pool: &PgPool, migrations_path: &str) -> anyhow::Result<()> {
    let migrator = Migrator::new(Path::new(migrations_path)).await?;
    migrator.run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}
