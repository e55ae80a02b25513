use std::error::Error;
use std::fmt;

/// Represents errors that can occur in Solana client operations
#[derive(Debug, Clone)]
pub enum LedgerClientError {
    /// Transport failure talking to the RPC or WebSocket endpoint
    NetworkError(String),
    /// The RPC node answered with a JSON-RPC error object
    RpcError(String),
    /// Response could not be interpreted
    ParseError(String),
    /// Live subscription ended or was dropped by the server
    SubscriptionClosed(String),
    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for LedgerClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerClientError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LedgerClientError::RpcError(msg) => write!(f, "Solana RPC error: {}", msg),
            LedgerClientError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            LedgerClientError::SubscriptionClosed(msg) => {
                write!(f, "Subscription closed: {}", msg)
            }
            LedgerClientError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for LedgerClientError {}

impl From<reqwest::Error> for LedgerClientError {
    fn from(error: reqwest::Error) -> Self {
        LedgerClientError::NetworkError(error.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for LedgerClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        LedgerClientError::SubscriptionClosed(error.to_string())
    }
}

impl From<serde_json::Error> for LedgerClientError {
    fn from(error: serde_json::Error) -> Self {
        LedgerClientError::ParseError(error.to_string())
    }
}
