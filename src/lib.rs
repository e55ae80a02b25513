//! Staking program event indexer for Solana.
//!
//! Converts the transaction history of a single program into a deduplicated
//! log of stake, unstake and reward-withdrawal events.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;
