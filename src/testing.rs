//! In-memory doubles for the external capabilities, shared by unit tests

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::balance::BalanceOracle;
use crate::error::{Error, Result};
use crate::token::TokenDescriptor;
use crate::transfer::{Notice, Notifier, TokenTransferSubmitter};
use crate::wallet::{AddressDeriver, TransactionRequest, TransactionSigner, WalletProvider};

pub const EOA: Address = Address::repeat_byte(0x11);
pub const AVO: Address = Address::repeat_byte(0x22);

pub fn token(byte: u8, name: &str, decimals: u8) -> TokenDescriptor {
    TokenDescriptor::new(Address::repeat_byte(byte), name, decimals)
}

/// Token balances keyed by (account, token)
#[derive(Debug, Default)]
pub struct Ledger {
    balances: Mutex<HashMap<(Address, Address), U256>>,
}

impl Ledger {
    pub fn set(&self, account: Address, token: Address, amount: U256) {
        self.balances.lock().unwrap().insert((account, token), amount);
    }

    pub fn get(&self, account: Address, token: Address) -> U256 {
        self.balances
            .lock()
            .unwrap()
            .get(&(account, token))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn move_balance(&self, token: Address, from: Address, to: Address, amount: U256) {
        let mut balances = self.balances.lock().unwrap();
        let from_balance = balances.entry((from, token)).or_insert(U256::ZERO);
        *from_balance = from_balance.saturating_sub(amount);
        let to_balance = balances.entry((to, token)).or_insert(U256::ZERO);
        *to_balance += amount;
    }
}

/// Oracle answering from a [`Ledger`], optionally failing for some tokens
pub struct ScriptedOracle {
    ledger: Arc<Ledger>,
    failing: HashSet<Address>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, token: Address) -> Self {
        self.failing.insert(token);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceOracle for ScriptedOracle {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn balances(&self, account: Address, tokens: &[Address]) -> Result<Vec<U256>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokens
            .iter()
            .map(|token| {
                if self.failing.contains(token) {
                    Err(Error::BalanceQuery {
                        token: *token,
                        reason: "scripted failure".to_string(),
                    })
                } else {
                    Ok(self.ledger.get(account, *token))
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub token: Address,
    pub destination: Address,
    pub amount: U256,
}

/// Submitter that records calls and, when settling, moves the ledger balance
pub struct RecordingSubmitter {
    ledger: Option<Arc<Ledger>>,
    failing: HashSet<Address>,
    attempts: AtomicUsize,
    submissions: Mutex<Vec<Submission>>,
}

impl RecordingSubmitter {
    pub fn settling(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger: Some(ledger),
            failing: HashSet::new(),
            attempts: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, token: Address) -> Self {
        self.failing.insert(token);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenTransferSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        token: &TokenDescriptor,
        destination: Address,
        amount: U256,
        signer: &dyn TransactionSigner,
    ) -> Result<B256> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&token.address) {
            return Err(Error::TransactionSend("scripted rejection".to_string()));
        }

        self.submissions.lock().unwrap().push(Submission {
            token: token.address,
            destination,
            amount,
        });
        if let Some(ledger) = &self.ledger {
            ledger.move_balance(token.address, signer.address(), destination, amount);
        }
        Ok(B256::repeat_byte(0xab))
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

/// Signer that records every request and returns a fixed hash
pub struct RecordingSigner {
    address: Address,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl RecordingSigner {
    pub const TX_HASH: B256 = B256::repeat_byte(0xcd);

    pub fn new(address: Address) -> Self {
        Self {
            address,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSigner for RecordingSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_unchecked(&self, tx: TransactionRequest) -> Result<B256> {
        self.sent.lock().unwrap().push(tx);
        Ok(Self::TX_HASH)
    }
}

/// Wallet with a fixed account list
pub struct StaticWallet {
    accounts: Vec<Address>,
}

impl StaticWallet {
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    fn signer_for(&self, account: Address) -> Result<Arc<dyn TransactionSigner>> {
        Ok(Arc::new(RecordingSigner::new(account)))
    }
}

/// Deriver mapping every owner to a fixed wallet
pub struct StaticDeriver {
    pub wallet: Address,
}

#[async_trait]
impl AddressDeriver for StaticDeriver {
    async fn derive(&self, _owner: Address, _index: u32) -> Result<Address> {
        Ok(self.wallet)
    }
}

/// Local HTTP endpoint answering every request with one canned response
pub struct HttpStub {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl HttpStub {
    pub async fn serve(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    if !read_request(&mut socket).await {
                        return;
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { url, hits }
    }

    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Read one full request (headers plus Content-Length body)
async fn read_request(socket: &mut TcpStream) -> bool {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return true;
        }
    }
}
