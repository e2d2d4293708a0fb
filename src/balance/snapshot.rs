//! Balance snapshots and the per-account panel board

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use super::BalanceOracle;
use crate::error::Result;
use crate::token::TokenDescriptor;

/// One token's balance in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub token: TokenDescriptor,
    pub raw: U256,
    /// `raw` scaled by the token's decimals
    pub display: String,
}

/// Balances of every tracked token for one account, taken together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub account: Address,
    pub entries: Vec<TokenBalance>,
    pub taken_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    /// Raw balance of a token, if it is part of this snapshot
    pub fn raw_balance(&self, token: Address) -> Option<U256> {
        self.entries
            .iter()
            .find(|entry| entry.token.address == token)
            .map(|entry| entry.raw)
    }

    /// Display string of a token, if it is part of this snapshot
    pub fn display_balance(&self, token: Address) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.token.address == token)
            .map(|entry| entry.display.as_str())
    }
}

/// Query every token concurrently and build a full snapshot
///
/// Any single failure fails the whole snapshot so a panel is never partially
/// updated.
pub async fn fetch_snapshot(
    oracle: &dyn BalanceOracle,
    account: Address,
    tokens: &[TokenDescriptor],
) -> Result<BalanceSnapshot> {
    let raws = try_join_all(
        tokens
            .iter()
            .map(|token| oracle.balance_of(account, token.address)),
    )
    .await?;

    let entries = tokens
        .iter()
        .zip(raws)
        .map(|(token, raw)| TokenBalance {
            display: token.format_amount(raw),
            token: token.clone(),
            raw,
        })
        .collect();

    Ok(BalanceSnapshot {
        account,
        entries,
        taken_at: Utc::now(),
    })
}

#[derive(Debug, Clone)]
struct Panel {
    sequence: u64,
    snapshot: BalanceSnapshot,
}

/// Displayed balance panels, keyed by account
///
/// Each refresh takes a sequence number before it starts. A finished snapshot
/// replaces the panel only if its sequence is newer than the applied one, so
/// a slow refresh can never clobber a later one.
#[derive(Debug, Default)]
pub struct SnapshotBoard {
    sequence: AtomicU64,
    panels: DashMap<Address, Panel>,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next request sequence number
    pub fn begin(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a snapshot taken under `sequence`. Returns false if it was stale.
    pub fn apply(&self, sequence: u64, snapshot: BalanceSnapshot) -> bool {
        let account = snapshot.account;
        match self.panels.entry(account) {
            Entry::Occupied(mut panel) => {
                if panel.get().sequence >= sequence {
                    debug!(
                        "Discarding stale snapshot for {} (seq {} <= applied {})",
                        account,
                        sequence,
                        panel.get().sequence
                    );
                    return false;
                }
                panel.insert(Panel { sequence, snapshot });
            }
            Entry::Vacant(slot) => {
                slot.insert(Panel { sequence, snapshot });
            }
        }
        true
    }

    /// Fetch a fresh snapshot and apply it
    ///
    /// Returns whether the snapshot was applied.
    pub async fn refresh(
        &self,
        oracle: &dyn BalanceOracle,
        account: Address,
        tokens: &[TokenDescriptor],
    ) -> Result<bool> {
        let sequence = self.begin();
        let snapshot = fetch_snapshot(oracle, account, tokens).await?;
        let applied = self.apply(sequence, snapshot);
        if applied {
            info!(
                "Refreshed balances for {} via {} (seq {})",
                account,
                oracle.name(),
                sequence
            );
        }
        Ok(applied)
    }

    /// Currently displayed snapshot for an account
    pub fn snapshot(&self, account: Address) -> Option<BalanceSnapshot> {
        self.panels.get(&account).map(|panel| panel.snapshot.clone())
    }

    /// Drop every panel (on disconnect)
    pub fn clear(&self) {
        self.panels.clear();
    }
}
