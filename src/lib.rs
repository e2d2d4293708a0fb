//! Avocado Sweep Library
//!
//! Connects an EVM wallet, derives its counterfactual Avocado smart wallet and
//! moves ERC-20 balances from the EOA into it.

pub mod abi;
pub mod balance;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod rpc;
pub mod token;
pub mod transfer;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use token::TokenDescriptor;
