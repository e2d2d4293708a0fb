//! Signing capability handed out by a connected wallet

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::rpc::{quantity, JsonRpcClient};

/// Transaction envelope for `eth_sendTransaction`
///
/// `gas_price` and `gas_limit` left as `None` are filled in by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    #[serde(serialize_with = "quantity::serialize")]
    pub value: U256,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "quantity::serialize_opt"
    )]
    pub gas_price: Option<U256>,
    #[serde(
        rename = "gas",
        skip_serializing_if = "Option::is_none",
        serialize_with = "quantity::serialize_opt"
    )]
    pub gas_limit: Option<U256>,
    pub data: Bytes,
}

/// Something that can sign and broadcast transactions for one account
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Account this signer is bound to
    fn address(&self) -> Address;

    /// Sign and broadcast without waiting for a receipt. Returns the transaction hash.
    async fn send_unchecked(&self, tx: TransactionRequest) -> Result<B256>;
}

/// Signer that delegates to the wallet provider's `eth_sendTransaction`
pub struct ProviderSigner {
    account: Address,
    rpc: JsonRpcClient,
}

impl ProviderSigner {
    pub fn new(account: Address, rpc: JsonRpcClient) -> Self {
        Self { account, rpc }
    }
}

#[async_trait]
impl TransactionSigner for ProviderSigner {
    fn address(&self) -> Address {
        self.account
    }

    async fn send_unchecked(&self, tx: TransactionRequest) -> Result<B256> {
        if tx.from != self.account {
            return Err(Error::SignerMismatch {
                signer: self.account,
                expected: tx.from,
            });
        }

        debug!("eth_sendTransaction to {} from {}", tx.to, tx.from);

        // Not retried: a resend could broadcast twice
        self.rpc
            .call("eth_sendTransaction", &[tx])
            .await
            .map_err(|e| Error::TransactionSend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HttpStub, AVO, EOA};
    use alloy_primitives::address;

    #[test]
    fn test_fixed_gas_envelope() {
        let tx = TransactionRequest {
            from: address!("1111111111111111111111111111111111111111"),
            to: address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
            value: U256::ZERO,
            gas_price: Some(U256::from(20_000_000_000u64)),
            gas_limit: Some(U256::from(90_000u64)),
            data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["value"], "0x0");
        assert_eq!(json["gasPrice"], "0x4a817c800");
        assert_eq!(json["gas"], "0x15f90");
        assert_eq!(json["data"], "0xa9059cbb");
        assert_eq!(
            json["to"].as_str().unwrap().to_lowercase(),
            "0xdac17f958d2ee523a2206206994597c13d831ec7"
        );
    }

    #[test]
    fn test_provider_gas_envelope_omits_gas_fields() {
        let tx = TransactionRequest {
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x22),
            value: U256::ZERO,
            gas_price: None,
            gas_limit: None,
            data: Bytes::new(),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("gasPrice").is_none());
        assert!(json.get("gas").is_none());
    }

    fn sweep_request() -> TransactionRequest {
        TransactionRequest {
            from: EOA,
            to: AVO,
            value: U256::ZERO,
            gas_price: None,
            gas_limit: None,
            data: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn test_send_is_never_retried() {
        let stub = HttpStub::serve(503, "").await;
        let rpc = JsonRpcClient::new(stub.url.clone(), 2_000).unwrap().with_retries(3);
        let signer = ProviderSigner::new(EOA, rpc);

        let err = signer.send_unchecked(sweep_request()).await.unwrap_err();
        assert!(matches!(err, Error::TransactionSend(_)));
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_send_returns_hash() {
        let stub = HttpStub::serve(
            200,
            r#"{"jsonrpc":"2.0","id":1,"result":"0xcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcd"}"#,
        )
        .await;
        let rpc = JsonRpcClient::new(stub.url.clone(), 2_000).unwrap();
        let signer = ProviderSigner::new(EOA, rpc);

        let hash = signer.send_unchecked(sweep_request()).await.unwrap();
        assert_eq!(hash, B256::repeat_byte(0xcd));
    }

    #[tokio::test]
    async fn test_foreign_sender_rejected_before_sending() {
        let stub = HttpStub::serve(200, "").await;
        let rpc = JsonRpcClient::new(stub.url.clone(), 2_000).unwrap();
        let signer = ProviderSigner::new(AVO, rpc);

        let err = signer.send_unchecked(sweep_request()).await.unwrap_err();
        assert!(matches!(err, Error::SignerMismatch { .. }));
        assert_eq!(stub.hits(), 0);
    }
}
