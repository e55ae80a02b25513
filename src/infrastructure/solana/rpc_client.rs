//! JSON-RPC over HTTP plus `logsSubscribe` over WebSocket

use async_trait::async_trait;
use futures::{future, SinkExt, StreamExt};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use super::client::{LedgerClient, LogStream};
use super::parser;
use crate::config::{AppConfig, SolanaConfig};
use crate::domain::models::{LogNotification, ParsedTransaction, SignatureInfo};
use crate::infrastructure::solana::error::LedgerClientError;
use crate::utils::logging;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Solana RPC node client
#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    rpc_url: String,
    ws_url: String,
    commitment: String,
    client: Client,
}

impl SolanaRpcClient {
    /// Create a new client for the configured cluster
    pub fn new(config: &SolanaConfig) -> Result<Self, LedgerClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LedgerClientError::ConfigError(e.to_string()))?;

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            ws_url: config.ws_url.clone(),
            commitment: config.commitment.clone(),
            client,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, LedgerClientError> {
        Self::new(&config.solana)
    }

    /// Make a JSON-RPC call and return its `result` member
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerClientError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerClientError::NetworkError(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(LedgerClientError::RpcError(format!("{}: {}", method, error)));
        }

        response_json
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerClientError::ParseError(format!("No result in {} response", method)))
    }
}

#[async_trait]
impl LedgerClient for SolanaRpcClient {
    fn provider_name(&self) -> String {
        format!("Solana RPC ({})", self.rpc_url)
    }

    async fn list_signatures(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, LedgerClientError> {
        let mut options = json!({
            "limit": limit,
            "commitment": self.commitment,
        });
        if let Some(before) = before {
            options["before"] = json!(before);
        }

        let result = self
            .rpc_call("getSignaturesForAddress", json!([address, options]))
            .await?;

        parser::parse_signature_page(&result)
    }

    async fn fetch_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, LedgerClientError> {
        let result = self
            .rpc_call(
                "getTransaction",
                json!([
                    signature,
                    {
                        "encoding": "jsonParsed",
                        "commitment": self.commitment,
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        parser::parse_transaction(signature, &result).map(Some)
    }

    async fn subscribe_logs(&self, address: &str) -> Result<LogStream, LedgerClientError> {
        let (mut ws, _response) = connect_async(self.ws_url.as_str()).await?;

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "logsSubscribe",
            "params": [
                {"mentions": [address]},
                {"commitment": self.commitment}
            ]
        });
        ws.send(Message::Text(request.to_string())).await?;

        logging::log_info(&format!(
            "Subscribed to logs for {} via {}",
            address, self.ws_url
        ));

        let notifications = ws
            .filter_map(|message| future::ready(notification_from_message(message)))
            .boxed();

        Ok(notifications)
    }
}

fn notification_from_message(
    message: Result<Message, tungstenite::Error>,
) -> Option<Result<LogNotification, LedgerClientError>> {
    match message {
        Ok(Message::Text(text)) => parser::parse_logs_notification(&text),
        Ok(Message::Close(frame)) => Some(Err(LedgerClientError::SubscriptionClosed(format!(
            "server closed the connection: {:?}",
            frame
        )))),
        Ok(_) => None,
        Err(error) => Some(Err(error.into())),
    }
}
