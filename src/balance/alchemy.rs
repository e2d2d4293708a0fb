//! Alchemy token balance API
//!
//! API Documentation: https://docs.alchemy.com/reference/alchemy-gettokenbalances

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::BalanceOracle;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rpc::{parse_quantity, JsonRpcClient};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalancesResult {
    token_balances: Vec<TokenBalanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalanceEntry {
    contract_address: Address,
    #[serde(default)]
    token_balance: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Balance oracle backed by `alchemy_getTokenBalances`
pub struct AlchemyOracle {
    rpc: JsonRpcClient,
}

impl AlchemyOracle {
    /// Create an oracle for `{base_url}/{api_key}`
    pub fn new(base_url: &str, api_key: &str, timeout_ms: u64, max_retries: u32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::MissingEnvVar("ALCHEMY_API_KEY".to_string()));
        }
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), api_key);
        let rpc = JsonRpcClient::new(endpoint, timeout_ms)?.with_retries(max_retries);
        Ok(Self { rpc })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.balances.alchemy_url,
            &config.balances.api_key,
            config.rpc.timeout_ms,
            config.rpc.max_retries,
        )
    }
}

#[async_trait]
impl BalanceOracle for AlchemyOracle {
    fn name(&self) -> &'static str {
        "alchemy"
    }

    async fn balances(&self, account: Address, tokens: &[Address]) -> Result<Vec<U256>> {
        let result: TokenBalancesResult = self
            .rpc
            .call_with_retry("alchemy_getTokenBalances", &(account, tokens))
            .await?;

        debug!(
            "alchemy_getTokenBalances returned {} entries for {}",
            result.token_balances.len(),
            account
        );

        extract_balances(&result, tokens)
    }
}

/// Pick out the requested tokens in request order
fn extract_balances(result: &TokenBalancesResult, tokens: &[Address]) -> Result<Vec<U256>> {
    tokens
        .iter()
        .map(|token| {
            let entry = result
                .token_balances
                .iter()
                .find(|entry| entry.contract_address == *token)
                .ok_or_else(|| Error::BalanceQuery {
                    token: *token,
                    reason: "token missing from response".to_string(),
                })?;

            if let Some(error) = entry.error.as_ref().filter(|e| !e.is_null()) {
                return Err(Error::BalanceQuery {
                    token: *token,
                    reason: error.to_string(),
                });
            }

            let raw = entry.token_balance.as_deref().ok_or_else(|| Error::BalanceQuery {
                token: *token,
                reason: "no tokenBalance field".to_string(),
            })?;

            parse_quantity(raw)
        })
        .collect()
}
