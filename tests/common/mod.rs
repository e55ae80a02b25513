#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use stake_indexer::domain::models::{
    LogNotification, ParsedInstruction, ParsedTransaction, SignatureInfo,
};
use stake_indexer::infrastructure::persistence::{DbPool, EventRepository, RepositoryFactory};
use stake_indexer::infrastructure::solana::{LedgerClient, LedgerClientError, LogStream};

pub const PROGRAM_ID: &str = "DMRhLCuWBSVWGYYbTd7oEFqiECqtZe4JGv7CC6as69bQ";
pub const PAYER: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

/// Fresh in-memory database with the schema applied
pub async fn setup_repository() -> EventRepository {
    let pool = DbPool::connect("sqlite::memory:")
        .await
        .expect("sqlite connection");
    pool.run_migrations().await.expect("migrations");
    RepositoryFactory::create_repositories(&pool).event
}

/// Transaction paid by `PAYER` with the given logs and instructions
pub fn transaction(
    signature: &str,
    logs: &[&str],
    instructions: Vec<ParsedInstruction>,
) -> ParsedTransaction {
    ParsedTransaction {
        signature: signature.to_string(),
        block_time: Some(1_700_000_000),
        failed: false,
        log_messages: logs.iter().map(|line| line.to_string()).collect(),
        account_keys: vec![PAYER.to_string(), PROGRAM_ID.to_string()],
        instructions,
    }
}

pub fn stake_tx(signature: &str, amount: u64) -> ParsedTransaction {
    let amount_line = format!("Program log: Staked {} tokens", amount);
    transaction(
        signature,
        &["Program log: Instruction: Stake", amount_line.as_str()],
        vec![],
    )
}

/// Discriminator followed by a little-endian u64
pub fn instruction_bytes(amount: u64) -> Vec<u8> {
    let mut bytes = vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    bytes.extend_from_slice(&amount.to_le_bytes());
    bytes
}

/// Scripted ledger: a fixed newest-first history, a transaction map and a
/// one-shot list of live notifications per subscription
#[derive(Debug, Default)]
pub struct MockLedger {
    history: Vec<SignatureInfo>,
    transactions: Mutex<HashMap<String, ParsedTransaction>>,
    failing_fetches: Mutex<HashSet<String>>,
    subscriptions: Mutex<Vec<Vec<LogNotification>>>,
    fetched: Mutex<Vec<String>>,
    page_cursors: Mutex<Vec<Option<String>>>,
    list_failures_left: AtomicUsize,
    list_delay: Option<Duration>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// History given newest first
    pub fn with_history(mut self, history: Vec<SignatureInfo>) -> Self {
        self.history = history;
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn with_list_failures(self, failures: usize) -> Self {
        self.list_failures_left.store(failures, Ordering::SeqCst);
        self
    }

    pub fn with_subscription(self, notifications: Vec<LogNotification>) -> Self {
        self.subscriptions.lock().unwrap().push(notifications);
        self
    }

    pub fn put_transaction(&self, tx: ParsedTransaction) {
        self.transactions
            .lock()
            .unwrap()
            .insert(tx.signature.clone(), tx);
    }

    pub fn fail_fetch(&self, signature: &str) {
        self.failing_fetches
            .lock()
            .unwrap()
            .insert(signature.to_string());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn page_cursors(&self) -> Vec<Option<String>> {
        self.page_cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn provider_name(&self) -> String {
        "mock".to_string()
    }

    async fn list_signatures(
        &self,
        _address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, LedgerClientError> {
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .list_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(LedgerClientError::NetworkError("connection reset".to_string()));
        }

        self.page_cursors
            .lock()
            .unwrap()
            .push(before.map(ToString::to_string));

        let start = match before {
            None => 0,
            Some(cursor) => match self.history.iter().position(|info| info.signature == cursor) {
                Some(position) => position + 1,
                None => return Ok(Vec::new()),
            },
        };
        let end = (start + limit).min(self.history.len());

        Ok(self.history[start..end].to_vec())
    }

    async fn fetch_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, LedgerClientError> {
        self.fetched.lock().unwrap().push(signature.to_string());

        if self.failing_fetches.lock().unwrap().contains(signature) {
            return Err(LedgerClientError::RpcError("node is behind".to_string()));
        }

        Ok(self.transactions.lock().unwrap().get(signature).cloned())
    }

    async fn subscribe_logs(&self, _address: &str) -> Result<LogStream, LedgerClientError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if subscriptions.is_empty() {
            return Err(LedgerClientError::NetworkError("no subscription".to_string()));
        }
        let notifications = subscriptions.remove(0);

        Ok(stream::iter(notifications.into_iter().map(Ok)).boxed())
    }
}
