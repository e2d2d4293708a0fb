//! Connected-session view: the EOA, its paired Avocado wallet and both balance panels

use alloy_primitives::Address;
use std::sync::Arc;
use tracing::{info, warn};

use crate::balance::{build_oracle, BalanceOracle, BalanceSnapshot, SnapshotBoard};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::token::TokenDescriptor;
use crate::transfer::{
    ConsoleNotifier, Erc20Submitter, GasPolicy, Notifier, TokenTransferSubmitter,
    TransferOrchestrator, TransferReport,
};
use crate::wallet::{AddressDeriver, AvocadoForwarder, RpcWalletProvider, WalletProvider, WalletSession};

/// External capabilities a dashboard is wired to
pub struct Capabilities {
    pub wallet: Arc<dyn WalletProvider>,
    pub deriver: Arc<dyn AddressDeriver>,
    pub oracle: Arc<dyn BalanceOracle>,
    pub submitter: Arc<dyn TokenTransferSubmitter>,
    pub notifier: Arc<dyn Notifier>,
}

impl Capabilities {
    /// Production wiring from config
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            wallet: Arc::new(RpcWalletProvider::from_config(&config.wallet)),
            deriver: Arc::new(AvocadoForwarder::from_config(config)?),
            oracle: build_oracle(config)?,
            submitter: Arc::new(Erc20Submitter::new(GasPolicy::from_config(&config.gas))),
            notifier: Arc::new(ConsoleNotifier),
        })
    }
}

pub struct Dashboard {
    session: WalletSession,
    deriver: Arc<dyn AddressDeriver>,
    oracle: Arc<dyn BalanceOracle>,
    submitter: Arc<dyn TokenTransferSubmitter>,
    notifier: Arc<dyn Notifier>,
    board: SnapshotBoard,
    tokens: Vec<TokenDescriptor>,
    wallet_index: u32,
    paired: Option<Address>,
}

impl Dashboard {
    pub fn new(capabilities: Capabilities, tokens: Vec<TokenDescriptor>, wallet_index: u32) -> Self {
        Self {
            session: WalletSession::new(capabilities.wallet),
            deriver: capabilities.deriver,
            oracle: capabilities.oracle,
            submitter: capabilities.submitter,
            notifier: capabilities.notifier,
            board: SnapshotBoard::new(),
            tokens,
            wallet_index,
            paired: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Capabilities::from_config(config)?,
            config.tokens.clone(),
            config.factory.index,
        ))
    }

    /// Connect the wallet, derive the paired wallet and load both panels
    ///
    /// Returns `(eoa, paired)`. Balance refresh failures are logged, not returned.
    pub async fn connect(&mut self) -> Result<(Address, Address)> {
        let account = self.session.connect().await?;

        let (eoa_refresh, derived) = tokio::join!(
            self.board.refresh(self.oracle.as_ref(), account, &self.tokens),
            self.deriver.derive(account, self.wallet_index),
        );

        if let Err(e) = eoa_refresh {
            warn!("Could not load balances for {}: {}", account, e);
        }

        let paired = derived?;
        self.paired = Some(paired);
        info!("Paired Avocado wallet: {}", paired);

        if let Err(e) = self
            .board
            .refresh(self.oracle.as_ref(), paired, &self.tokens)
            .await
        {
            warn!("Could not load balances for {}: {}", paired, e);
        }

        Ok((account, paired))
    }

    /// Forget the account, the paired wallet and both panels
    pub fn disconnect(&mut self) {
        self.session.disconnect();
        self.paired = None;
        self.board.clear();
    }

    /// Sweep every token from the EOA into the paired wallet
    pub async fn transfer(&self) -> Result<TransferReport> {
        let (source, destination) = self.accounts()?;
        let signer = self.session.signer()?;

        TransferOrchestrator::new(
            self.oracle.as_ref(),
            self.submitter.as_ref(),
            self.notifier.as_ref(),
            &self.board,
        )
        .transfer(source, destination, &self.tokens, signer.as_ref())
        .await
    }

    /// Reload both panels
    pub async fn refresh(&self) -> Result<()> {
        let (source, destination) = self.accounts()?;
        let (a, b) = tokio::join!(
            self.board.refresh(self.oracle.as_ref(), source, &self.tokens),
            self.board.refresh(self.oracle.as_ref(), destination, &self.tokens),
        );
        a?;
        b?;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.account()
    }

    pub fn paired_wallet(&self) -> Option<Address> {
        self.paired
    }

    pub fn panel(&self, account: Address) -> Option<BalanceSnapshot> {
        self.board.snapshot(account)
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    fn accounts(&self) -> Result<(Address, Address)> {
        match (self.session.account(), self.paired) {
            (Some(source), Some(destination)) => Ok((source, destination)),
            _ => Err(Error::NotConnected),
        }
    }
}
