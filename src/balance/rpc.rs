//! Balances via plain `balanceOf` calls against any JSON-RPC node

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use futures::future::try_join_all;

use super::BalanceOracle;
use crate::abi;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rpc::JsonRpcClient;

/// Balance oracle issuing one `eth_call` per token
pub struct Erc20BalanceOracle {
    rpc: JsonRpcClient,
}

impl Erc20BalanceOracle {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let rpc = JsonRpcClient::new(config.rpc.endpoint.clone(), config.rpc.timeout_ms)?
            .with_retries(config.rpc.max_retries);
        Ok(Self::new(rpc))
    }

    async fn query(&self, account: Address, token: Address) -> Result<U256> {
        let output = self
            .rpc
            .eth_call(token, abi::encode_balance_of(account))
            .await?;

        abi::decode_balance_of(&output).map_err(|e| Error::BalanceQuery {
            token,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl BalanceOracle for Erc20BalanceOracle {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn balances(&self, account: Address, tokens: &[Address]) -> Result<Vec<U256>> {
        try_join_all(tokens.iter().map(|token| self.query(account, *token))).await
    }
}
