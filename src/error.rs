//! Error types for the sweeper

use alloy_primitives::Address;
use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sweeper
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Wallet session errors
    #[error("Wallet provider unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Signer is bound to {signer}, expected {expected}")]
    SignerMismatch { signer: Address, expected: Address },

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC timeout after {0}ms")]
    RpcTimeout(u64),

    #[error("RPC connection failed: {0}")]
    RpcConnection(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    // Balance and derivation errors
    #[error("Balance query failed for token {token}: {reason}")]
    BalanceQuery { token: Address, reason: String },

    #[error("Address derivation failed: {0}")]
    Derivation(String),

    // Transfer errors
    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    // Decoding errors
    #[error("Invalid hex quantity: {0}")]
    InvalidQuantity(String),

    #[error("ABI decode failed: {0}")]
    AbiDecode(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Rpc(_) | Error::RpcTimeout(_) | Error::RpcConnection(_) => true,
            Error::HttpStatus(status) => *status == 429 || *status >= 500,
            // -32005: limit exceeded, returned by most hosted providers when rate limited
            Error::JsonRpc { code, .. } => *code == -32005,
            _ => false,
        }
    }

    /// Check if this error means the wallet provider could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_) | Error::RpcTimeout(_) | Error::RpcConnection(_) | Error::HttpStatus(_)
        )
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::RpcTimeout(0)
        } else if e.is_connect() {
            Error::RpcConnection(e.to_string())
        } else if e.is_decode() {
            Error::Deserialization(e.to_string())
        } else {
            Error::Rpc(e.to_string())
        }
    }
}

// Conversion from ABI decoding errors
impl From<alloy_sol_types::Error> for Error {
    fn from(e: alloy_sol_types::Error) -> Self {
        Error::AbiDecode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::RpcTimeout(30_000).is_retryable());
        assert!(Error::HttpStatus(429).is_retryable());
        assert!(Error::HttpStatus(502).is_retryable());
        assert!(!Error::HttpStatus(401).is_retryable());
        assert!(Error::JsonRpc { code: -32005, message: "limit".into() }.is_retryable());
        assert!(!Error::JsonRpc { code: 4001, message: "rejected".into() }.is_retryable());
        assert!(!Error::TransactionSend("nonce too low".into()).is_retryable());
    }

    #[test]
    fn test_transport_classification() {
        assert!(Error::RpcConnection("refused".into()).is_transport());
        assert!(!Error::JsonRpc { code: 4001, message: "rejected".into() }.is_transport());
    }
}
