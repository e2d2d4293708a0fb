//! Wallet connection state

use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::signer::{ProviderSigner, TransactionSigner};
use crate::config::WalletConfig;
use crate::error::{Error, Result};
use crate::rpc::JsonRpcClient;

/// JSON-RPC "method not found"
const METHOD_NOT_FOUND: i64 = -32601;

/// A wallet that can hand out accounts and signers
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for its accounts, prompting the user if needed
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Signing capability for one of the wallet's accounts
    fn signer_for(&self, account: Address) -> Result<Arc<dyn TransactionSigner>>;
}

/// Wallet reached over JSON-RPC (browser-wallet bridge, Frame, a dev node, ...)
pub struct RpcWalletProvider {
    endpoint: String,
    timeout_ms: u64,
}

impl RpcWalletProvider {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.endpoint.clone(), config.timeout_ms)
    }

    fn client(&self) -> Result<JsonRpcClient> {
        JsonRpcClient::new(self.endpoint.clone(), self.timeout_ms)
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let rpc = self.client()?;

        let accounts = match rpc.call("eth_requestAccounts", &[(); 0]).await {
            Err(Error::JsonRpc { code, .. }) if code == METHOD_NOT_FOUND => {
                // Plain nodes only know eth_accounts
                rpc.call("eth_accounts", &[(); 0]).await
            }
            other => other,
        };

        accounts.map_err(|e| {
            if e.is_transport() {
                Error::WalletUnavailable(e.to_string())
            } else {
                Error::ConnectionRejected(e.to_string())
            }
        })
    }

    fn signer_for(&self, account: Address) -> Result<Arc<dyn TransactionSigner>> {
        Ok(Arc::new(ProviderSigner::new(account, self.client()?)))
    }
}

/// Connected account plus its signing capability
#[derive(Clone)]
pub struct Connection {
    pub account: Address,
    pub signer: Arc<dyn TransactionSigner>,
}

/// Connect/disconnect state over a wallet provider
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    connection: Option<Connection>,
}

impl WalletSession {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            connection: None,
        }
    }

    /// Connect to the first account the wallet offers
    ///
    /// Already connected sessions return the current account. On failure the
    /// session stays disconnected.
    pub async fn connect(&mut self) -> Result<Address> {
        if let Some(connection) = &self.connection {
            return Ok(connection.account);
        }

        let accounts = self.provider.request_accounts().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| Error::ConnectionRejected("wallet returned no accounts".to_string()))?;

        if accounts.len() > 1 {
            warn!(
                "Wallet exposes {} accounts, using the first: {}",
                accounts.len(),
                account
            );
        }

        let signer = self.provider.signer_for(account)?;
        self.connection = Some(Connection { account, signer });
        info!("Wallet connected: {}", account);
        Ok(account)
    }

    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            info!("Wallet disconnected: {}", connection.account);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.connection.as_ref().map(|c| c.account)
    }

    pub fn signer(&self) -> Result<Arc<dyn TransactionSigner>> {
        self.connection
            .as_ref()
            .map(|c| c.signer.clone())
            .ok_or(Error::NotConnected)
    }
}
