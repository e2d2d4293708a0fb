//! User-facing notices raised by a sweep

use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Every tracked token had a zero balance
    NothingToTransfer,
    /// Some token units failed
    PartialFailure { failed: usize, total: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NothingToTransfer => write!(f, "There are no tokens in your EOA to transfer."),
            Notice::PartialFailure { failed, total } => {
                write!(f, "{} of {} token transfers failed.", failed, total)
            }
        }
    }
}

/// Where notices go
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Prints notices to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        warn!("{}", notice);
        println!("\n*** {} ***", notice);
    }
}
