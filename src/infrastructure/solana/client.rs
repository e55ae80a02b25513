use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::models::{LogNotification, ParsedTransaction, SignatureInfo};
use crate::infrastructure::solana::error::LedgerClientError;

/// Live feed of confirmed log notifications for a program
pub type LogStream = BoxStream<'static, Result<LogNotification, LedgerClientError>>;

/// Capabilities the indexer needs from a Solana node
#[async_trait]
pub trait LedgerClient: Send + Sync + std::fmt::Debug {
    /// Get the provider name for identification
    fn provider_name(&self) -> String;

    /// Signatures touching `address`, newest first, strictly older than
    /// `before` when given. An empty page means history is exhausted.
    async fn list_signatures(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, LedgerClientError>;

    /// Fetch a confirmed transaction; `None` when the node does not have it
    async fn fetch_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, LedgerClientError>;

    /// Subscribe to log notifications mentioning `address`.
    /// The stream ends or yields an error when the connection drops.
    async fn subscribe_logs(&self, address: &str) -> Result<LogStream, LedgerClientError>;
}
