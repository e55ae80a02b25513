pub mod client;
mod error;
pub mod parser;
mod rpc_client;

pub use client::{LedgerClient, LogStream};
pub use error::LedgerClientError;
pub use rpc_client::SolanaRpcClient;
