use crate::config::Config;
use anyhow::{Context, Result};
use sqlx::PgPool;

pub struct ValidationReport {
    pub environment: bool,
    pub database: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.database
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("Database Connectivity: {}", status(self.database));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

/// Checks configuration and, when a pool is available, database reachability and migrations.
pub async fn validate_environment(config: &Config, pool: Option<&PgPool>) -> ValidationReport {
    let mut report = ValidationReport {
        environment: true,
        database: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {}", e));
    }

    let database = match pool {
        Some(pool) => validate_database(pool).await,
        None => Err(anyhow::anyhow!("no database connection")),
    };
    if let Err(e) = database {
        report.database = false;
        report.errors.push(format!("Database: {:#}", e));
    }

    report
}

fn validate_env_vars(config: &Config) -> Result<()> {
    let database_url = config.database_url()?;
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be greater than 0");
    }
    if config.operation_timeout_ms == 0 {
        anyhow::bail!("OPERATION_TIMEOUT_MS must be greater than 0");
    }
    if config.db_max_connections == 0 {
        anyhow::bail!("DB_MAX_CONNECTIONS must be greater than 0");
    }

    let url = url::Url::parse(database_url).context("DATABASE_URL is not a valid URL")?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        anyhow::bail!("DATABASE_URL must use the postgres scheme");
    }

    Ok(())
}

async fn validate_database(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Failed to connect to database")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .context("Failed to check migrations table")?;

    if applied == 0 {
        anyhow::bail!("No migrations applied");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;

    fn config(database_url: Option<&str>) -> Config {
        Config {
            server_port: 8080,
            database_url: database_url.map(str::to_string),
            db_max_connections: 90,
            db_connect_attempts: 10,
            db_connect_retry_ms: 1000,
            operation_timeout_ms: 5000,
            migrations_path: "./migrations".to_string(),
            cors_allowed_origins: None,
            log_format: LogFormat::Text,
        }
    }

    #[test]
    fn test_validate_env_vars_missing_database_url() {
        assert!(validate_env_vars(&config(None)).is_err());
    }

    #[test]
    fn test_validate_env_vars_wrong_scheme() {
        assert!(validate_env_vars(&config(Some("mysql://localhost/wallets"))).is_err());
    }

    #[test]
    fn test_validate_env_vars_ok() {
        let config = config(Some("postgres://user:pw@localhost:5432/wallets?sslmode=disable"));
        assert!(validate_env_vars(&config).is_ok());
    }

    #[tokio::test]
    async fn test_report_without_pool_fails_database_check() {
        let report = validate_environment(&config(Some("postgres://localhost/wallets")), None).await;
        assert!(report.environment);
        assert!(!report.database);
        assert!(!report.is_valid());
    }
}
