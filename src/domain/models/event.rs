use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of staking action recorded for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "stake")]
    Stake,
    #[serde(rename = "unstake")]
    Unstake,
    #[serde(rename = "withdrawRewards")]
    WithdrawRewards,
}

impl EventType {
    /// Marker checked in this order; the first one found in the logs wins
    pub const ALL: [EventType; 3] = [
        EventType::Stake,
        EventType::Unstake,
        EventType::WithdrawRewards,
    ];

    /// Name stored in the database and exposed to clients
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Stake => "stake",
            EventType::Unstake => "unstake",
            EventType::WithdrawRewards => "withdrawRewards",
        }
    }

    /// Program log line emitted when the instruction executes
    pub fn log_marker(&self) -> &'static str {
        match self {
            EventType::Stake => "Instruction: Stake",
            EventType::Unstake => "Instruction: Unstake",
            EventType::WithdrawRewards => "Instruction: WithdrawRewards",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stake" => Ok(EventType::Stake),
            "unstake" => Ok(EventType::Unstake),
            "withdrawRewards" => Ok(EventType::WithdrawRewards),
            other => Err(format!("Unknown event type: {}", other)),
        }
    }
}

/// A staking action observed on-chain, keyed by transaction signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Transaction signature, unique per event
    pub signature: String,

    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Fee payer of the transaction
    pub user: String,

    /// Token base units, when it could be recovered
    pub amount: Option<u64>,

    /// Chain-reported block time in seconds since epoch
    pub block_time: Option<i64>,

    /// When this indexer first recorded the event
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates a new Event stamped with the current time
    pub fn new(
        signature: String,
        event_type: EventType,
        user: String,
        amount: Option<u64>,
        block_time: Option<i64>,
    ) -> Self {
        Self {
            signature,
            event_type,
            user,
            amount,
            block_time,
            timestamp: Utc::now(),
        }
    }

    pub fn has_amount(&self) -> bool {
        self.amount.is_some()
    }
}

/// Result of an idempotent insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer got there first; carries the stored row
    AlreadyExists(Event),
}

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_staked_events: u64,
    pub total_unstaked_events: u64,
}

/// Event reported directly by a client after it submitted the transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSubmission {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub signature: String,
    pub amount: Option<u64>,
    pub block_time: Option<i64>,
}

/// Result of a manual submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Event),
    /// Existing row had no amount and the submission supplied one
    Updated(Event),
    AlreadyExists(Option<Event>),
}

impl SubmitOutcome {
    /// Client-facing status line
    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::Created(_) => "Event saved successfully",
            SubmitOutcome::Updated(_) => "Event updated with amount",
            SubmitOutcome::AlreadyExists(_) => "Event already exists",
        }
    }
}
