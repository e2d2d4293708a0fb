//! Configuration loading and validation

use alloy_primitives::{address, Address};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::rpc::redact_endpoint;
use crate::token::{default_tokens, TokenDescriptor, MAX_DECIMALS};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub factory: FactoryConfig,
    #[serde(default)]
    pub balances: BalancesConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenDescriptor>,
}

/// Wallet provider the EOA is connected through
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint exposing eth_requestAccounts / eth_sendTransaction
    #[serde(default = "default_wallet_endpoint")]
    pub endpoint: String,
    /// Generous by default: the wallet may wait on the user to approve
    #[serde(default = "default_wallet_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            endpoint: default_wallet_endpoint(),
            timeout_ms: default_wallet_timeout_ms(),
        }
    }
}

/// Read-only node used for contract view calls
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Avocado forwarder used to derive the paired wallet
#[derive(Debug, Clone, Deserialize)]
pub struct FactoryConfig {
    #[serde(default = "default_factory_address")]
    pub address: Address,
    /// Salt index passed to computeAvocado
    #[serde(default)]
    pub index: u32,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            address: default_factory_address(),
            index: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceProvider {
    /// alchemy_getTokenBalances
    Alchemy,
    /// balanceOf eth_calls on the read-only node
    Rpc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalancesConfig {
    #[serde(default = "default_balance_provider")]
    pub provider: BalanceProvider,
    #[serde(default = "default_alchemy_url")]
    pub alchemy_url: String,
    #[serde(default = "default_alchemy_api_key")]
    pub api_key: String,
}

impl Default for BalancesConfig {
    fn default() -> Self {
        Self {
            provider: default_balance_provider(),
            alchemy_url: default_alchemy_url(),
            api_key: default_alchemy_api_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GasMode {
    /// Flat gas price and limit from this config
    Fixed,
    /// Let the wallet provider estimate both
    Provider,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GasConfig {
    #[serde(default = "default_gas_mode")]
    pub mode: GasMode,
    #[serde(default = "default_gas_price_gwei")]
    pub price_gwei: u64,
    #[serde(default = "default_gas_limit")]
    pub limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            mode: default_gas_mode(),
            price_gwei: default_gas_price_gwei(),
            limit: default_gas_limit(),
        }
    }
}

// Default value functions
fn default_wallet_endpoint() -> String {
    std::env::var("WALLET_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:1248".into())
}

fn default_wallet_timeout_ms() -> u64 {
    120_000
}

fn default_rpc_endpoint() -> String {
    std::env::var("RPC_ENDPOINT").unwrap_or_else(|_| "https://polygon.llamarpc.com".into())
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_factory_address() -> Address {
    address!("46978CD477A496028A18c02F07ab7F35EDBa5A54")
}

fn default_balance_provider() -> BalanceProvider {
    BalanceProvider::Alchemy
}

fn default_alchemy_url() -> String {
    "https://eth-mainnet.g.alchemy.com/v2".into()
}

fn default_alchemy_api_key() -> String {
    std::env::var("ALCHEMY_API_KEY").unwrap_or_default()
}

fn default_gas_mode() -> GasMode {
    GasMode::Fixed
}

fn default_gas_price_gwei() -> u64 {
    20
}

fn default_gas_limit() -> u64 {
    90_000
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("rpc.endpoint", default_rpc_endpoint())?
            .set_default("rpc.timeout_ms", default_timeout_ms() as i64)?
            .set_default("rpc.max_retries", default_max_retries() as i64)?
            .set_default("wallet.endpoint", default_wallet_endpoint())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix AVO_)
            .add_source(
                config::Environment::with_prefix("AVO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate endpoints
        for (name, endpoint) in [
            ("wallet.endpoint", &self.wallet.endpoint),
            ("rpc.endpoint", &self.rpc.endpoint),
            ("balances.alchemy_url", &self.balances.alchemy_url),
        ] {
            url::Url::parse(endpoint)
                .with_context(|| format!("Invalid {} URL: {}", name, redact_endpoint(endpoint)))?;
        }

        if self.factory.address == Address::ZERO {
            anyhow::bail!("factory.address must not be the zero address");
        }

        // Validate token set
        if self.tokens.is_empty() {
            anyhow::bail!("At least one token must be configured");
        }

        let mut seen = HashSet::new();
        for token in &self.tokens {
            if token.name.trim().is_empty() {
                anyhow::bail!("Token {} has an empty name", token.address);
            }
            if token.decimals > MAX_DECIMALS {
                anyhow::bail!(
                    "Token {} has {} decimals, maximum is {}",
                    token.name,
                    token.decimals,
                    MAX_DECIMALS
                );
            }
            if !seen.insert(token.address) {
                anyhow::bail!("Token {} is configured twice", token.address);
            }
        }

        // Validate gas policy
        if self.gas.mode == GasMode::Fixed {
            if self.gas.price_gwei == 0 {
                anyhow::bail!("gas.price_gwei must be positive in fixed mode");
            }
            if self.gas.limit == 0 {
                anyhow::bail!("gas.limit must be positive in fixed mode");
            }
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        let gas = match self.gas.mode {
            GasMode::Fixed => format!("fixed, {} gwei, limit {}", self.gas.price_gwei, self.gas.limit),
            GasMode::Provider => "estimated by wallet".to_string(),
        };

        let tokens: Vec<String> = self
            .tokens
            .iter()
            .map(|t| format!("    {} ({} decimals): {}", t.name, t.decimals, t.address))
            .collect();

        format!(
            r#"Configuration:
  Wallet:
    endpoint: {}
    timeout: {}ms
  RPC:
    endpoint: {}
    timeout: {}ms
    max_retries: {}
  Factory:
    address: {}
    index: {}
  Balances:
    provider: {:?}
    alchemy_url: {}
    api_key: {}
  Gas: {}
  Tokens:
{}
"#,
            redact_endpoint(&self.wallet.endpoint),
            self.wallet.timeout_ms,
            redact_endpoint(&self.rpc.endpoint),
            self.rpc.timeout_ms,
            self.rpc.max_retries,
            self.factory.address,
            self.factory.index,
            self.balances.provider,
            redact_endpoint(&self.balances.alchemy_url),
            if self.balances.api_key.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            gas,
            tokens.join("\n"),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet: WalletConfig::default(),
            rpc: RpcConfig::default(),
            factory: FactoryConfig::default(),
            balances: BalancesConfig::default(),
            gas: GasConfig::default(),
            tokens: default_tokens(),
        }
    }
}
