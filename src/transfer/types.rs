//! Transfer outcome types

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::token::TokenDescriptor;

/// What happened to one token during a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Observed balance was zero, nothing submitted
    Skipped,
    /// Transfer handed to the signer (not necessarily mined)
    Submitted { amount: U256, tx_hash: B256 },
    /// Balance check or submission failed
    Failed { cause: String },
}

impl TransferOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, TransferOutcome::Submitted { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TransferOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TransferOutcome::Failed { .. })
    }
}

/// Outcome for a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token: TokenDescriptor,
    pub outcome: TransferOutcome,
}

impl fmt::Display for TokenTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            TransferOutcome::Skipped => write!(f, "{}: skipped (balance is 0)", self.token.name),
            TransferOutcome::Submitted { amount, tx_hash } => write!(
                f,
                "{}: sent {} (tx {})",
                self.token.name,
                self.token.format_amount(*amount),
                tx_hash
            ),
            TransferOutcome::Failed { cause } => write!(f, "{}: FAILED - {}", self.token.name, cause),
        }
    }
}

/// Result of one sweep, one entry per token in token order
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub source: Address,
    pub destination: Address,
    pub transfers: Vec<TokenTransfer>,
    pub started_at: DateTime<Utc>,
}

impl TransferReport {
    pub fn submitted(&self) -> usize {
        self.transfers.iter().filter(|t| t.outcome.is_submitted()).count()
    }

    pub fn skipped(&self) -> usize {
        self.transfers.iter().filter(|t| t.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.transfers.iter().filter(|t| t.outcome.is_failed()).count()
    }

    /// True when every token was skipped for a zero balance
    pub fn nothing_to_transfer(&self) -> bool {
        self.transfers.iter().all(|t| t.outcome.is_skipped())
    }

    pub fn outcome_for(&self, token: Address) -> Option<&TransferOutcome> {
        self.transfers
            .iter()
            .find(|t| t.token.address == token)
            .map(|t| &t.outcome)
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "{} submitted, {} skipped, {} failed",
            self.submitted(),
            self.skipped(),
            self.failed()
        )
    }
}
