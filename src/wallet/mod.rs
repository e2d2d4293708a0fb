//! Wallet connection, signing and address derivation
//!
//! # Architecture
//!
//! ```text
//! WalletProvider → WalletSession → TransactionSigner
//!                        ↓
//!                  AddressDeriver → paired Avocado wallet
//! ```

pub mod deriver;
pub mod session;
pub mod signer;

pub use deriver::{AddressDeriver, AvocadoForwarder};
pub use session::{Connection, RpcWalletProvider, WalletProvider, WalletSession};
pub use signer::{ProviderSigner, TransactionRequest, TransactionSigner};
