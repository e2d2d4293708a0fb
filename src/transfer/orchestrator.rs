//! Sweep every positive token balance from a source account to a destination

use alloy_primitives::Address;
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use super::notice::{Notice, Notifier};
use super::submitter::TokenTransferSubmitter;
use super::types::{TokenTransfer, TransferOutcome, TransferReport};
use crate::balance::{BalanceOracle, SnapshotBoard};
use crate::error::{Error, Result};
use crate::token::TokenDescriptor;
use crate::wallet::TransactionSigner;

/// Moves full token balances from one account to another
///
/// Each token is an independent unit: its balance check and submission run
/// concurrently with the others, and a failure is recorded in that token's
/// outcome without touching its siblings. There is no atomicity across
/// tokens.
pub struct TransferOrchestrator<'a> {
    oracle: &'a dyn BalanceOracle,
    submitter: &'a dyn TokenTransferSubmitter,
    notifier: &'a dyn Notifier,
    board: &'a SnapshotBoard,
}

impl<'a> TransferOrchestrator<'a> {
    pub fn new(
        oracle: &'a dyn BalanceOracle,
        submitter: &'a dyn TokenTransferSubmitter,
        notifier: &'a dyn Notifier,
        board: &'a SnapshotBoard,
    ) -> Self {
        Self {
            oracle,
            submitter,
            notifier,
            board,
        }
    }

    /// Sweep `tokens` from `source` to `destination`
    ///
    /// Only precondition violations return `Err`. Per-token failures are
    /// reported as [`TransferOutcome::Failed`]. Both panels are refreshed
    /// afterwards whatever the outcome.
    pub async fn transfer(
        &self,
        source: Address,
        destination: Address,
        tokens: &[TokenDescriptor],
        signer: &dyn TransactionSigner,
    ) -> Result<TransferReport> {
        check_accounts(source, destination)?;
        if signer.address() != source {
            return Err(Error::SignerMismatch {
                signer: signer.address(),
                expected: source,
            });
        }

        let started_at = Utc::now();
        info!(
            "Sweeping {} tokens from {} to {}",
            tokens.len(),
            source,
            destination
        );

        let transfers = join_all(
            tokens
                .iter()
                .map(|token| self.transfer_token(source, destination, token, signer)),
        )
        .await;

        let report = TransferReport {
            source,
            destination,
            transfers,
            started_at,
        };

        info!("Sweep finished: {}", report.summary());

        if report.nothing_to_transfer() {
            self.notifier.notify(&Notice::NothingToTransfer);
        } else if report.failed() > 0 {
            self.notifier.notify(&Notice::PartialFailure {
                failed: report.failed(),
                total: report.transfers.len(),
            });
        }

        self.refresh_panels(source, destination, tokens).await;

        Ok(report)
    }

    /// One token's unit of work. Never fails: errors become the outcome.
    async fn transfer_token(
        &self,
        source: Address,
        destination: Address,
        token: &TokenDescriptor,
        signer: &dyn TransactionSigner,
    ) -> TokenTransfer {
        let outcome = match self.sweep_token(source, destination, token, signer).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Transfer of {} failed: {}", token.name, e);
                TransferOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        };

        TokenTransfer {
            token: token.clone(),
            outcome,
        }
    }

    async fn sweep_token(
        &self,
        source: Address,
        destination: Address,
        token: &TokenDescriptor,
        signer: &dyn TransactionSigner,
    ) -> Result<TransferOutcome> {
        let amount = self.oracle.balance_of(source, token.address).await?;

        if amount.is_zero() {
            info!("Skipped transfer of {} as balance is 0", token.name);
            return Ok(TransferOutcome::Skipped);
        }

        let tx_hash = self
            .submitter
            .submit(token, destination, amount, signer)
            .await?;

        info!(
            "Transferred {} {} to {} (tx: {})",
            amount, token.name, destination, tx_hash
        );

        Ok(TransferOutcome::Submitted { amount, tx_hash })
    }

    async fn refresh_panels(
        &self,
        source: Address,
        destination: Address,
        tokens: &[TokenDescriptor],
    ) {
        let (source_refresh, destination_refresh) = tokio::join!(
            self.board.refresh(self.oracle, source, tokens),
            self.board.refresh(self.oracle, destination, tokens),
        );

        if let Err(e) = source_refresh {
            warn!("Balance refresh for {} failed: {}", source, e);
        }
        if let Err(e) = destination_refresh {
            warn!("Balance refresh for {} failed: {}", destination, e);
        }
    }
}

fn check_accounts(source: Address, destination: Address) -> Result<()> {
    if source == Address::ZERO {
        return Err(Error::InvalidAccount("source account is not resolved".to_string()));
    }
    if destination == Address::ZERO {
        return Err(Error::InvalidAccount(
            "destination account is not resolved".to_string(),
        ));
    }
    if source == destination {
        return Err(Error::InvalidAccount(format!(
            "source and destination are both {}",
            source
        )));
    }
    Ok(())
}
