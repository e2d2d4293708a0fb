//! Minimal JSON-RPC 2.0 client over HTTP
//!
//! Every endpoint the sweeper talks to (wallet provider, read-only node,
//! balance API) speaks JSON-RPC, so they all share this client. Handles are
//! cheap to build and are created per operation from config.

use alloy_primitives::{Address, Bytes, U256};
use backoff::{future::retry, ExponentialBackoff};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default delay before the first retry of a read-only call
const RETRY_BASE_DELAY_MS: u64 = 100;

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: ?Sized> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `eth_call` request object
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}

/// JSON-RPC client bound to a single endpoint
pub struct JsonRpcClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: u64,
    max_retries: u32,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client with a per-request timeout and no retries
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_ms,
            max_retries: 0,
            next_id: AtomicU64::new(1),
        })
    }

    /// Set how many times transient failures of read-only calls are retried
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue a single JSON-RPC request (no retry)
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(
            "-> {} {} (id {})",
            redact_endpoint(&self.endpoint),
            method,
            id
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let body: RpcResponse<R> = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("{} response: {}", method, e)))?;

        if let Some(error) = body.error {
            return Err(Error::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }

        body.result
            .ok_or_else(|| Error::Deserialization(format!("{} response has no result", method)))
    }

    /// Issue a read-only request, retrying transient failures with exponential backoff
    ///
    /// Never use this for state-changing methods like `eth_sendTransaction`.
    pub async fn call_with_retry<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(RETRY_BASE_DELAY_MS),
            max_interval: Duration::from_millis(RETRY_BASE_DELAY_MS * 8),
            max_elapsed_time: None,
            ..Default::default()
        };

        let max_retries = self.max_retries;
        let mut attempts = 0u32;

        retry(backoff, || {
            attempts += 1;
            let attempt = attempts;
            async move {
                match self.call(method, params).await {
                    Ok(result) => Ok(result),
                    Err(e) if e.is_retryable() && attempt <= max_retries => {
                        warn!("Retryable RPC error on {} (attempt {}): {}", method, attempt, e);
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }

    /// Read-only contract call against the latest block
    pub async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let request = CallRequest { to, data };
        self.call_with_retry("eth_call", &(request, "latest")).await
    }

    /// Chain id of the endpoint
    pub async fn chain_id(&self) -> Result<u64> {
        let raw: String = self.call_with_retry("eth_chainId", &[(); 0]).await?;
        let digits = strip_hex_prefix(&raw);
        u64::from_str_radix(digits, 16).map_err(|_| Error::InvalidQuantity(raw.clone()))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        // reqwest messages embed the full URL, which may carry an API key
        match Error::from(e.without_url()) {
            Error::RpcTimeout(_) => Error::RpcTimeout(self.timeout_ms),
            Error::RpcConnection(reason) => {
                Error::RpcConnection(format!("{}: {}", redact_endpoint(&self.endpoint), reason))
            }
            other => other,
        }
    }
}

/// Parse a hex-encoded JSON-RPC quantity. `"0x"` and `"0x0"` are zero.
pub fn parse_quantity(raw: &str) -> Result<U256> {
    let digits = strip_hex_prefix(raw.trim());
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|_| Error::InvalidQuantity(raw.to_string()))
}

/// Encode a value as a JSON-RPC quantity (`0x`-prefixed, no leading zeros)
pub fn to_quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

fn strip_hex_prefix(raw: &str) -> &str {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
}

/// Reduce an endpoint to scheme and host so API keys in paths or queries never reach logs
pub fn redact_endpoint(endpoint: &str) -> String {
    match url::Url::parse(endpoint) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            }
        }
        Err(_) => "(invalid url)".to_string(),
    }
}

/// Serde helpers writing `U256` values as JSON-RPC quantities
pub mod quantity {
    use alloy_primitives::U256;
    use serde::Serializer;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_quantity(*value))
    }

    pub fn serialize_opt<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::to_quantity(*value)),
            None => serializer.serialize_none(),
        }
    }
}
