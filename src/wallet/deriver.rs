//! Counterfactual smart-wallet address derivation

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use crate::abi;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rpc::JsonRpcClient;

/// Computes the address a smart wallet will occupy once deployed
#[async_trait]
pub trait AddressDeriver: Send + Sync {
    /// Deterministic: the same owner and index always give the same address
    async fn derive(&self, owner: Address, index: u32) -> Result<Address>;
}

/// Avocado forwarder's `computeAvocado` view call
pub struct AvocadoForwarder {
    forwarder: Address,
    rpc: JsonRpcClient,
}

impl AvocadoForwarder {
    pub fn new(forwarder: Address, rpc: JsonRpcClient) -> Self {
        Self { forwarder, rpc }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let rpc = JsonRpcClient::new(config.rpc.endpoint.clone(), config.rpc.timeout_ms)?
            .with_retries(config.rpc.max_retries);
        Ok(Self::new(config.factory.address, rpc))
    }
}

#[async_trait]
impl AddressDeriver for AvocadoForwarder {
    async fn derive(&self, owner: Address, index: u32) -> Result<Address> {
        let output = self
            .rpc
            .eth_call(self.forwarder, abi::encode_compute_avocado(owner, index))
            .await?;

        let wallet = abi::decode_compute_avocado(&output)
            .map_err(|e| Error::Derivation(format!("computeAvocado({}, {}): {}", owner, index, e)))?;

        if wallet == Address::ZERO {
            return Err(Error::Derivation(format!(
                "forwarder {} returned the zero address",
                self.forwarder
            )));
        }

        debug!("Derived Avocado wallet {} for {} (index {})", wallet, owner, index);
        Ok(wallet)
    }
}
