//! Avocado Sweep - move ERC-20 balances from an EOA into its Avocado smart wallet
//!
//! # WARNING
//! - Transfers are signed by your wallet and sent to a live network.
//! - Submitted transactions cannot be cancelled from this tool.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use avo_sweep::cli::commands;
use avo_sweep::config::{BalanceProvider, Config, GasMode};
use avo_sweep::rpc::redact_endpoint;

/// Avocado Sweep - EOA to Avocado wallet token transfers
#[derive(Parser)]
#[command(name = "avo-sweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show the EOA and Avocado balances
    Connect,

    /// Show token balances
    Balances {
        /// Account to inspect (default: the connected EOA and its Avocado wallet)
        #[arg(long)]
        account: Option<String>,
    },

    /// Compute the Avocado wallet address for an owner
    Derive {
        /// Owner EOA address
        owner: String,

        /// Wallet index (default: from config)
        #[arg(long)]
        index: Option<u32>,
    },

    /// Transfer every token balance from the EOA to its Avocado wallet
    Transfer {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration (secrets masked)
    Config,

    /// Check system health (wallet provider, RPC, balance API)
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("avo_sweep=info"));
    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    }

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    startup_checks(&config);

    // Execute command
    let result = match cli.command {
        Commands::Connect => commands::connect(&config).await,
        Commands::Balances { account } => commands::balances(&config, account).await,
        Commands::Derive { owner, index } => commands::derive(&config, &owner, index).await,
        Commands::Transfer { force } => commands::transfer(&config, force).await,
        Commands::Config => commands::show_config(&config),
        Commands::Health => commands::health(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Log the settings that decide where funds and queries go
fn startup_checks(config: &Config) {
    info!(
        "Factory {} (index {}), {} tokens tracked",
        config.factory.address,
        config.factory.index,
        config.tokens.len()
    );

    match config.gas.mode {
        GasMode::Fixed => warn!(
            "Fixed gas policy active: {} gwei, limit {}",
            config.gas.price_gwei, config.gas.limit
        ),
        GasMode::Provider => info!("Gas price and limit left to the wallet provider"),
    }

    match config.balances.provider {
        BalanceProvider::Alchemy if config.balances.api_key.is_empty() => {
            warn!("ALCHEMY_API_KEY is not set; balance commands will fail")
        }
        BalanceProvider::Alchemy => info!("Balances from Alchemy token API"),
        BalanceProvider::Rpc => info!("Balances from balanceOf calls on {}", redact_endpoint(&config.rpc.endpoint)),
    }
}
