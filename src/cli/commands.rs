//! CLI command implementations

use alloy_primitives::Address;
use anyhow::Result;
use dialoguer::Confirm;
use std::time::Instant;
use tracing::{error, info};

use crate::balance::{build_oracle, fetch_snapshot, BalanceSnapshot};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::rpc::{redact_endpoint, JsonRpcClient};
use crate::token::shorten_address;
use crate::transfer::TransferOutcome;
use crate::wallet::{AddressDeriver, AvocadoForwarder};

/// Connect the wallet and show both accounts side by side
pub async fn connect(config: &Config) -> Result<()> {
    let mut dashboard = Dashboard::from_config(config)?;
    let (eoa, paired) = dashboard.connect().await?;

    print_panel("EOA", eoa, dashboard.panel(eoa).as_ref());
    print_panel("Avocado Wallet", paired, dashboard.panel(paired).as_ref());

    Ok(())
}

/// Show balances for one account, or for the connected pair
pub async fn balances(config: &Config, account: Option<String>) -> Result<()> {
    match account {
        Some(account) => {
            let account = parse_address(&account)?;
            let oracle = build_oracle(config)?;
            let snapshot = fetch_snapshot(oracle.as_ref(), account, &config.tokens).await?;
            print_panel("Account", account, Some(&snapshot));
        }
        None => connect(config).await?,
    }
    Ok(())
}

/// Print the counterfactual Avocado address for an owner
pub async fn derive(config: &Config, owner: &str, index: Option<u32>) -> Result<()> {
    let owner = parse_address(owner)?;
    let index = index.unwrap_or(config.factory.index);

    let forwarder = AvocadoForwarder::from_config(config)?;
    let wallet = forwarder.derive(owner, index).await?;

    println!("\n=== AVOCADO WALLET ===\n");
    println!("Owner: {}", owner);
    println!("Index: {}", index);
    println!("Wallet: {}", wallet);

    Ok(())
}

/// Sweep every token from the connected EOA into its Avocado wallet
pub async fn transfer(config: &Config, force: bool) -> Result<()> {
    let mut dashboard = Dashboard::from_config(config)?;
    let (eoa, paired) = dashboard.connect().await?;

    print_panel("EOA", eoa, dashboard.panel(eoa).as_ref());

    // Confirmation prompt
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Transfer the full balance of {} tokens from {} to {}? This cannot be undone.",
                dashboard.tokens().len(),
                shorten_address(&eoa),
                shorten_address(&paired)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            info!("Transfer cancelled by user");
            return Ok(());
        }
    }

    let report = match dashboard.transfer().await {
        Ok(report) => report,
        Err(e) => {
            error!("Transfer failed: {}", e);
            anyhow::bail!("Transfer failed: {}", e);
        }
    };

    println!("\n=== TRANSFER RESULTS ===\n");
    for transfer in &report.transfers {
        println!("  {}", transfer);
    }
    println!("\n{}", report.summary());

    print_panel("EOA", eoa, dashboard.panel(eoa).as_ref());
    print_panel("Avocado Wallet", paired, dashboard.panel(paired).as_ref());

    let failed: Vec<_> = report
        .transfers
        .iter()
        .filter(|t| matches!(t.outcome, TransferOutcome::Failed { .. }))
        .map(|t| t.token.name.as_str())
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("Transfers failed for: {}", failed.join(", "));
    }

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Check that the wallet provider and read-only node answer
pub async fn health(config: &Config) -> Result<()> {
    println!("\n=== SYSTEM HEALTH CHECK ===\n");

    let mut all_healthy = true;

    print!("Wallet provider ({})... ", redact_endpoint(&config.wallet.endpoint));
    match check_endpoint(&config.wallet.endpoint, config.rpc.timeout_ms).await {
        Ok((chain_id, latency)) => println!("OK (chain {}, {}ms)", chain_id, latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    print!("Read-only RPC ({})... ", redact_endpoint(&config.rpc.endpoint));
    match check_endpoint(&config.rpc.endpoint, config.rpc.timeout_ms).await {
        Ok((chain_id, latency)) => println!("OK (chain {}, {}ms)", chain_id, latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    print!("Balance API... ");
    match build_oracle(config) {
        Ok(oracle) => println!("{} configured", oracle.name()),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    println!();
    if all_healthy {
        println!("All systems healthy!");
    } else {
        println!("Some systems are unhealthy. Check the errors above.");
    }

    Ok(())
}

async fn check_endpoint(endpoint: &str, timeout_ms: u64) -> Result<(u64, u64)> {
    let client = JsonRpcClient::new(endpoint, timeout_ms)?;

    let start = Instant::now();
    let chain_id = client.chain_id().await?;
    let latency = start.elapsed().as_millis() as u64;

    Ok((chain_id, latency))
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", raw, e))
}

fn print_panel(label: &str, account: Address, snapshot: Option<&BalanceSnapshot>) {
    println!("\n=== {}: {} ===\n", label, shorten_address(&account));
    match snapshot {
        Some(snapshot) => {
            for entry in &snapshot.entries {
                println!("  {}: $ {}", entry.token.name, entry.display);
            }
        }
        None => println!("  (balances unavailable)"),
    }
}
