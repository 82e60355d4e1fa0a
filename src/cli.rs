use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::adapters::{InMemoryWalletRepository, PostgresWalletRepository};
use crate::config::Config;
use crate::domain::WalletOperation;
use crate::ports::WalletRepository;
use crate::services::WalletService;
use crate::{cors_layer, create_app, AppState};

#[derive(Parser)]
#[command(name = "wallet-ledger")]
#[command(about = "Wallet Ledger - deposit/withdraw service with an append-only transaction log", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Keep wallets in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,

        /// Balance of the wallet provisioned at startup in in-memory mode
        #[arg(long, default_value = "0", requires = "in_memory")]
        seed_balance: BigDecimal,
    },

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Wallet provisioning commands
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Configuration validation
    Config,

    /// Fire concurrent deposit requests at a running server
    LoadTest {
        /// Wallet operation endpoint
        #[arg(long, default_value = "http://localhost:8080/api/v1/wallet")]
        url: String,

        /// Target wallet UUID
        #[arg(long)]
        wallet_id: Uuid,

        /// Number of concurrent requests
        #[arg(long, default_value_t = 1000)]
        requests: usize,

        /// Amount deposited by each request
        #[arg(long, default_value = "1000")]
        amount: BigDecimal,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a wallet and print its UUID
    Create {
        /// Opening balance
        #[arg(short, long, default_value = "0")]
        balance: BigDecimal,
    },
}

pub async fn handle_serve(config: &Config, in_memory: bool, seed_balance: BigDecimal) -> anyhow::Result<()> {
    let repository: Arc<dyn WalletRepository> = if in_memory {
        let repository = InMemoryWalletRepository::new();
        let wallet = repository.create_wallet(seed_balance);
        tracing::warn!("Running with in-memory storage; nothing is persisted");
        tracing::info!(wallet_id = %wallet.id, balance = %wallet.balance, "Provisioned in-memory wallet");
        Arc::new(repository)
    } else {
        let pool = crate::db::create_pool(config).await?;
        crate::db::run_migrations(&pool, &config.migrations_path).await?;
        Arc::new(PostgresWalletRepository::new(pool))
    };

    let service = WalletService::new(repository, config.operation_timeout());
    let mut app = create_app(AppState::new(service));

    let origins = config.allowed_origins();
    if !origins.is_empty() {
        app = app.layer(cors_layer(&origins));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool, &config.migrations_path).await?;

    println!("✓ Database migrations completed");

    Ok(())
}

pub async fn handle_wallet_create(config: &Config, balance: BigDecimal) -> anyhow::Result<()> {
    if balance < BigDecimal::from(0) {
        anyhow::bail!("Opening balance must not be negative");
    }

    let pool = crate::db::create_pool(config).await?;
    let repository = PostgresWalletRepository::new(pool);
    let wallet = repository.create_wallet(balance).await?;

    tracing::info!(wallet_id = %wallet.id, "Wallet created");
    println!("✓ Wallet {} created with balance {}", wallet.id, wallet.balance);

    Ok(())
}

pub async fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!(
        "  Database URL: {}",
        config.database_url.as_deref().map(mask_password).unwrap_or_else(|| "<unset>".to_string())
    );
    println!("  Max Connections: {}", config.db_max_connections);
    println!("  Operation Timeout: {:?}", config.operation_timeout());

    let pool = match crate::db::create_pool(config).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!("Could not connect to database: {:#}", e);
            None
        }
    };

    let report = crate::startup::validate_environment(config, pool.as_ref()).await;
    report.print();

    if !report.is_valid() {
        anyhow::bail!("Configuration is invalid");
    }

    tracing::info!("Configuration is valid");
    Ok(())
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user_start = slash_pos + 2;
                let user = &url[user_start..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}

#[derive(Debug, Default)]
pub struct LoadTestReport {
    pub total: usize,
    pub server_errors: usize,
    pub failed_requests: usize,
    pub elapsed: Duration,
}

impl LoadTestReport {
    pub fn is_clean(&self) -> bool {
        self.server_errors == 0 && self.failed_requests == 0
    }
}

pub async fn handle_load_test(
    url: &str,
    wallet_id: Uuid,
    requests: usize,
    amount: BigDecimal,
) -> anyhow::Result<LoadTestReport> {
    let client = reqwest::Client::new();
    let op = WalletOperation::deposit(wallet_id, amount);
    let start = Instant::now();

    let responses = join_all((0..requests).map(|_| client.post(url).json(&op).send())).await;

    let mut report = LoadTestReport {
        total: requests,
        elapsed: start.elapsed(),
        ..Default::default()
    };
    for response in responses {
        match response {
            Ok(response) if response.status().is_server_error() => {
                tracing::warn!("received {} error", response.status().as_u16());
                report.server_errors += 1;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("failed to send request: {}", e);
                report.failed_requests += 1;
            }
        }
    }

    if report.is_clean() {
        println!(
            "Test completed successfully in {:?}. No 50X errors. Total requests: {}",
            report.elapsed, report.total
        );
    } else {
        println!(
            "Test finished with {} errors in {:?}",
            report.server_errors + report.failed_requests,
            report.elapsed
        );
    }

    Ok(report)
}
