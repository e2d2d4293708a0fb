//! ERC-20 transfer submission

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::abi;
use crate::config::{GasConfig, GasMode};
use crate::error::Result;
use crate::token::TokenDescriptor;
use crate::wallet::{TransactionRequest, TransactionSigner};

/// Wei per gwei
const GWEI: u128 = 1_000_000_000;

/// How gas price and limit are chosen for sweep transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPolicy {
    /// Flat values, never estimated
    Fixed { price_wei: u128, limit: u64 },
    /// Leave both fields out and let the wallet estimate
    Provider,
}

impl GasPolicy {
    pub const DEFAULT_PRICE_GWEI: u64 = 20;
    pub const DEFAULT_LIMIT: u64 = 90_000;

    pub fn from_config(gas: &GasConfig) -> Self {
        match gas.mode {
            GasMode::Fixed => GasPolicy::Fixed {
                price_wei: gas.price_gwei as u128 * GWEI,
                limit: gas.limit,
            },
            GasMode::Provider => GasPolicy::Provider,
        }
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        GasPolicy::Fixed {
            price_wei: Self::DEFAULT_PRICE_GWEI as u128 * GWEI,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Submits a token transfer through a signer
#[async_trait]
pub trait TokenTransferSubmitter: Send + Sync {
    /// Returns the transaction hash as soon as the signer accepts it
    async fn submit(
        &self,
        token: &TokenDescriptor,
        destination: Address,
        amount: U256,
        signer: &dyn TransactionSigner,
    ) -> Result<B256>;
}

/// Builds `transfer(to, amount)` calls and sends them unchecked
#[derive(Debug, Clone, Default)]
pub struct Erc20Submitter {
    gas: GasPolicy,
}

impl Erc20Submitter {
    pub fn new(gas: GasPolicy) -> Self {
        Self { gas }
    }

    /// Transaction envelope for moving `amount` of `token` from `from` to `destination`
    pub fn build_request(
        &self,
        from: Address,
        token: &TokenDescriptor,
        destination: Address,
        amount: U256,
    ) -> TransactionRequest {
        let (gas_price, gas_limit) = match self.gas {
            GasPolicy::Fixed { price_wei, limit } => {
                (Some(U256::from(price_wei)), Some(U256::from(limit)))
            }
            GasPolicy::Provider => (None, None),
        };

        TransactionRequest {
            from,
            to: token.address,
            value: U256::ZERO,
            gas_price,
            gas_limit,
            data: abi::encode_transfer(destination, amount),
        }
    }
}

#[async_trait]
impl TokenTransferSubmitter for Erc20Submitter {
    async fn submit(
        &self,
        token: &TokenDescriptor,
        destination: Address,
        amount: U256,
        signer: &dyn TransactionSigner,
    ) -> Result<B256> {
        let request = self.build_request(signer.address(), token, destination, amount);
        debug!(
            "Submitting {} {} to {} (gas: {:?})",
            amount, token.name, destination, self.gas
        );
        signer.send_unchecked(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{token, RecordingSigner, AVO, EOA};

    #[test]
    fn test_default_gas_is_flat() {
        assert_eq!(
            GasPolicy::default(),
            GasPolicy::Fixed {
                price_wei: 20_000_000_000,
                limit: 90_000
            }
        );
    }

    #[test]
    fn test_gas_policy_from_config() {
        let gas = GasConfig {
            mode: GasMode::Fixed,
            price_gwei: 35,
            limit: 120_000,
        };
        assert_eq!(
            GasPolicy::from_config(&gas),
            GasPolicy::Fixed {
                price_wei: 35_000_000_000,
                limit: 120_000
            }
        );

        let gas = GasConfig {
            mode: GasMode::Provider,
            ..gas
        };
        assert_eq!(GasPolicy::from_config(&gas), GasPolicy::Provider);
    }

    #[tokio::test]
    async fn test_submit_builds_erc20_transfer() {
        let usdt = token(0xa1, "USDT", 6);
        let signer = RecordingSigner::new(EOA);
        let submitter = Erc20Submitter::default();

        let hash = submitter
            .submit(&usdt, AVO, U256::from(5_000_000u64), &signer)
            .await
            .unwrap();
        assert_eq!(hash, RecordingSigner::TX_HASH);

        let sent = signer.sent();
        assert_eq!(sent.len(), 1);
        let tx = &sent[0];
        assert_eq!(tx.from, EOA);
        assert_eq!(tx.to, usdt.address);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.gas_price, Some(U256::from(20_000_000_000u64)));
        assert_eq!(tx.gas_limit, Some(U256::from(90_000u64)));
        assert_eq!(tx.data, abi::encode_transfer(AVO, U256::from(5_000_000u64)));
    }

    #[test]
    fn test_provider_gas_leaves_fields_empty() {
        let usdt = token(0xa1, "USDT", 6);
        let request = Erc20Submitter::new(GasPolicy::Provider).build_request(
            EOA,
            &usdt,
            AVO,
            U256::from(1u64),
        );
        assert!(request.gas_price.is_none());
        assert!(request.gas_limit.is_none());
    }
}
