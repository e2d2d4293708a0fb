//! Token balance lookup and balance panels
//!
//! # Architecture
//!
//! ```text
//! BalanceOracle (alchemy | rpc) → fetch_snapshot → SnapshotBoard
//! ```
//!
//! The board keeps one panel per account and only applies a snapshot if it
//! was requested after the one currently shown.

pub mod alchemy;
pub mod rpc;
pub mod snapshot;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{BalanceProvider, Config};
use crate::error::{Error, Result};

pub use alchemy::AlchemyOracle;
pub use rpc::Erc20BalanceOracle;
pub use snapshot::{fetch_snapshot, BalanceSnapshot, SnapshotBoard, TokenBalance};

/// Source of raw token balances
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Oracle name for logging
    fn name(&self) -> &'static str;

    /// Raw balances of `account`, one per entry of `tokens`, in the same order
    async fn balances(&self, account: Address, tokens: &[Address]) -> Result<Vec<U256>>;

    /// Raw balance of a single token
    async fn balance_of(&self, account: Address, token: Address) -> Result<U256> {
        let mut balances = self.balances(account, &[token]).await?;
        balances.pop().ok_or_else(|| Error::BalanceQuery {
            token,
            reason: "empty response".to_string(),
        })
    }
}

/// Build the oracle selected in config
pub fn build_oracle(config: &Config) -> Result<Arc<dyn BalanceOracle>> {
    let oracle: Arc<dyn BalanceOracle> = match config.balances.provider {
        BalanceProvider::Alchemy => Arc::new(AlchemyOracle::from_config(config)?),
        BalanceProvider::Rpc => Arc::new(Erc20BalanceOracle::from_config(config)?),
    };
    Ok(oracle)
}
