//! Token sweeping
//!
//! ```text
//! BalanceOracle ─┐
//!                ├→ TransferOrchestrator → TransferReport
//! Submitter ─────┘          ↓
//!                      SnapshotBoard (refresh both panels)
//! ```

pub mod notice;
pub mod orchestrator;
pub mod submitter;
pub mod types;

pub use notice::{ConsoleNotifier, Notice, Notifier};
pub use orchestrator::TransferOrchestrator;
pub use submitter::{Erc20Submitter, GasPolicy, TokenTransferSubmitter};
pub use types::{TokenTransfer, TransferOutcome, TransferReport};
