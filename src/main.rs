use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_ledger::cli::{self, Cli, Commands, DbCommands, WalletCommands};
use wallet_ledger::config::{Config, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    let cli = Cli::parse();

    match cli.command {
        None => cli::handle_serve(&config, false, Default::default()).await,
        Some(Commands::Serve {
            in_memory,
            seed_balance,
        }) => cli::handle_serve(&config, in_memory, seed_balance).await,
        Some(Commands::Db(DbCommands::Migrate)) => cli::handle_db_migrate(&config).await,
        Some(Commands::Wallet(WalletCommands::Create { balance })) => {
            cli::handle_wallet_create(&config, balance).await
        }
        Some(Commands::Config) => cli::handle_config_validate(&config).await,
        Some(Commands::LoadTest {
            url,
            wallet_id,
            requests,
            amount,
        }) => {
            let report = cli::handle_load_test(&url, wallet_id, requests, amount).await?;
            if !report.is_clean() {
                anyhow::bail!("load test saw {} server errors", report.server_errors);
            }
            Ok(())
        }
    }
}
