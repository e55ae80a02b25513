use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a program's signature history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub block_time: Option<i64>,
}

impl SignatureInfo {
    pub fn new(signature: impl Into<String>, block_time: Option<i64>) -> Self {
        Self {
            signature: signature.into(),
            block_time,
        }
    }
}

/// Text encoding of an undecoded instruction payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadEncoding {
    Base58,
    Base64,
}

/// Instruction data as delivered by the RPC node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionPayload {
    /// Payload the node already decoded into JSON
    Parsed(Value),
    /// Opaque bytes, still text-encoded
    Raw {
        data: String,
        encoding: PayloadEncoding,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedInstruction {
    /// Program the instruction is addressed to
    pub program_id: String,
    pub payload: InstructionPayload,
}

impl ParsedInstruction {
    pub fn parsed(program_id: impl Into<String>, payload: Value) -> Self {
        Self {
            program_id: program_id.into(),
            payload: InstructionPayload::Parsed(payload),
        }
    }

    pub fn raw(program_id: impl Into<String>, data: impl Into<String>, encoding: PayloadEncoding) -> Self {
        Self {
            program_id: program_id.into(),
            payload: InstructionPayload::Raw {
                data: data.into(),
                encoding,
            },
        }
    }
}

/// A confirmed transaction in the shape the classifier needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub signature: String,
    pub block_time: Option<i64>,
    /// Set when the transaction executed but returned an error
    pub failed: bool,
    pub log_messages: Vec<String>,
    /// Account keys in message order; the first is the fee payer
    pub account_keys: Vec<String>,
    pub instructions: Vec<ParsedInstruction>,
}

impl ParsedTransaction {
    pub fn fee_payer(&self) -> Option<&str> {
        self.account_keys.first().map(String::as_str)
    }
}

/// Live notification that a transaction mentioning the program was confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNotification {
    pub signature: String,
    /// False when the transaction failed on-chain
    pub logs_ok: bool,
}
