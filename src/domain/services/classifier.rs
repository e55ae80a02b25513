//! Turns a parsed transaction into an event type and, when derivable, an amount.
//!
//! The event type comes only from the program's `Instruction: …` log markers.
//! The amount is recovered by trying a fixed list of strategies in order; the
//! first one that yields a value wins and decode failures simply fall through.

use base64::Engine;
use serde_json::Value;

use crate::domain::models::{
    EventType, InstructionPayload, ParsedInstruction, ParsedTransaction, PayloadEncoding,
};
use crate::utils::logging;

/// Bytes 0..8 of an instruction payload select the instruction variant
const DISCRIMINATOR_LEN: usize = 8;
const AMOUNT_LEN: usize = 8;

type AmountStrategy = fn(&TransactionClassifier, &ParsedTransaction, EventType) -> Option<u64>;

/// Amount strategies in priority order
const AMOUNT_STRATEGIES: [(&str, AmountStrategy); 3] = [
    ("log_pattern", TransactionClassifier::amount_from_logs),
    ("parsed_instruction", TransactionClassifier::amount_from_parsed_instructions),
    ("raw_instruction", TransactionClassifier::amount_from_raw_instructions),
];

/// Outcome of classifying a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub event_type: EventType,
    pub amount: Option<u64>,
}

/// Classifier bound to the program whose instructions carry amounts
#[derive(Debug, Clone)]
pub struct TransactionClassifier {
    program_id: String,
}

impl TransactionClassifier {
    pub fn new(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
        }
    }

    /// Classify a transaction; `None` means it is not a staking event
    pub fn classify(&self, tx: &ParsedTransaction) -> Option<Classification> {
        let event_type = Self::event_type(&tx.log_messages)?;
        Some(Classification {
            event_type,
            amount: self.extract_amount(tx, event_type),
        })
    }

    /// Find the first known instruction marker in the logs
    pub fn event_type(logs: &[String]) -> Option<EventType> {
        EventType::ALL
            .into_iter()
            .find(|event_type| logs.iter().any(|line| line.contains(event_type.log_marker())))
    }

    /// Try each amount strategy in turn
    pub fn extract_amount(&self, tx: &ParsedTransaction, event_type: EventType) -> Option<u64> {
        AMOUNT_STRATEGIES.iter().find_map(|(name, strategy)| {
            let amount = strategy(self, tx, event_type)?;
            logging::log_debug(&format!(
                "Amount {} for {} recovered by {} strategy",
                amount,
                logging::short_signature(&tx.signature),
                name
            ));
            Some(amount)
        })
    }

    /// `Staked <n> tokens` / `Unstaked <n> tokens` in the program logs.
    /// Rewards withdrawals log no amount.
    fn amount_from_logs(&self, tx: &ParsedTransaction, event_type: EventType) -> Option<u64> {
        let verb = match event_type {
            EventType::Stake => "staked",
            EventType::Unstake => "unstaked",
            EventType::WithdrawRewards => return None,
        };

        tx.log_messages
            .iter()
            .find_map(|line| amount_after_verb(line, verb))
    }

    fn amount_from_parsed_instructions(
        &self,
        tx: &ParsedTransaction,
        _event_type: EventType,
    ) -> Option<u64> {
        self.program_instructions(tx)
            .find_map(|instruction| match &instruction.payload {
                InstructionPayload::Parsed(parsed) => amount_from_parsed(parsed),
                InstructionPayload::Raw { .. } => None,
            })
    }

    fn amount_from_raw_instructions(
        &self,
        tx: &ParsedTransaction,
        _event_type: EventType,
    ) -> Option<u64> {
        self.program_instructions(tx)
            .find_map(|instruction| match &instruction.payload {
                InstructionPayload::Raw { data, encoding } => {
                    decode_payload(data, *encoding).and_then(|bytes| amount_from_bytes(&bytes))
                }
                InstructionPayload::Parsed(_) => None,
            })
    }

    fn program_instructions<'a>(
        &'a self,
        tx: &'a ParsedTransaction,
    ) -> impl Iterator<Item = &'a ParsedInstruction> + 'a {
        tx.instructions
            .iter()
            .filter(move |instruction| instruction.program_id == self.program_id)
    }
}

/// Match `<verb>\s+<digits>\s+token(s)` case-insensitively. The verb must
/// start a word so `staked` is not found inside `Unstaked`.
fn amount_after_verb(line: &str, verb: &str) -> Option<u64> {
    let lower = line.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    lower.match_indices(verb).find_map(|(start, _)| {
        if start > 0 && is_word_byte(bytes[start - 1]) {
            return None;
        }

        let after_verb = skip_whitespace(&lower[start + verb.len()..])?;
        let digits_len = after_verb.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return None;
        }
        let (digits, rest) = after_verb.split_at(digits_len);

        if skip_whitespace(rest)?.starts_with("token") {
            digits.parse::<u64>().ok()
        } else {
            None
        }
    })
}

/// Strip at least one leading whitespace character
fn skip_whitespace(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    (trimmed.len() < text.len()).then_some(trimmed)
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Decoded instructions carry the amount under `info.amount`
fn amount_from_parsed(parsed: &Value) -> Option<u64> {
    if let Some(kind) = parsed.get("type").and_then(Value::as_str) {
        if kind.parse::<EventType>().is_err() {
            return None;
        }
    }

    let amount = parsed
        .get("info")
        .and_then(|info| info.get("amount"))
        .or_else(|| parsed.get("amount"))?;

    match amount {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn decode_payload(data: &str, encoding: PayloadEncoding) -> Option<Vec<u8>> {
    match encoding {
        PayloadEncoding::Base58 => bs58::decode(data).into_vec().ok(),
        PayloadEncoding::Base64 => base64::engine::general_purpose::STANDARD.decode(data).ok(),
    }
}

/// Little-endian u64 right after the 8-byte discriminator
pub fn amount_from_bytes(bytes: &[u8]) -> Option<u64> {
    let amount_bytes = bytes.get(DISCRIMINATOR_LEN..DISCRIMINATOR_LEN + AMOUNT_LEN)?;
    let mut buf = [0u8; AMOUNT_LEN];
    buf.copy_from_slice(amount_bytes);
    Some(u64::from_le_bytes(buf))
}
