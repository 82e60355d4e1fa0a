use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_connect_attempts: u32,
    pub db_connect_retry_ms: u64,
    pub operation_timeout_ms: u64,
    pub migrations_path: String,
    pub cors_allowed_origins: Option<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: parse_or("SERVER_PORT", 8080)?,
            database_url: database_url_from_env(),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 90)?,
            db_connect_attempts: parse_or("DB_CONNECT_ATTEMPTS", 10)?,
            db_connect_retry_ms: parse_or("DB_CONNECT_RETRY_MS", 1000)?,
            operation_timeout_ms: parse_or("OPERATION_TIMEOUT_MS", 5000)?,
            migrations_path: env::var("MIGRATIONS_PATH")
                .unwrap_or_else(|_| "./migrations".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok(),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "missing database configuration: set DATABASE_URL or all of POSTGRES_USER, POSTGRES_PASSWORD, POSTGRES_HOST, POSTGRES_PORT, POSTGRES_DB"
            )
        })
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn db_connect_retry(&self) -> Duration {
        Duration::from_millis(self.db_connect_retry_ms)
    }

    /// Comma-separated origins, blanks dropped.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the DSN is assembled from the `POSTGRES_*` variables.
fn database_url_from_env() -> Option<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Some(url);
    }

    let parts = ["POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_HOST", "POSTGRES_PORT", "POSTGRES_DB"]
        .iter()
        .map(|key| env::var(key).ok().filter(|v| !v.is_empty()))
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [user, password, host, port, db] => Some(build_dsn(user, password, host, port, db)),
        _ => None,
    }
}

pub fn build_dsn(user: &str, password: &str, host: &str, port: &str, db: &str) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode=disable",
        user, password, host, port, db
    )
}
