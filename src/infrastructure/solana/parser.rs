//! Conversion of `jsonParsed` RPC payloads into domain models

use serde_json::Value;

use crate::domain::models::{
    LogNotification, ParsedInstruction, ParsedTransaction, PayloadEncoding, SignatureInfo,
};
use crate::infrastructure::solana::error::LedgerClientError;
use crate::utils::logging;

/// Parse a `getSignaturesForAddress` result array
pub fn parse_signature_page(result: &Value) -> Result<Vec<SignatureInfo>, LedgerClientError> {
    let entries = result.as_array().ok_or_else(|| {
        LedgerClientError::ParseError("Signature list is not an array".to_string())
    })?;

    entries
        .iter()
        .map(|entry| {
            let signature = entry
                .get("signature")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    LedgerClientError::ParseError("Signature entry without signature".to_string())
                })?;
            Ok(SignatureInfo::new(
                signature,
                entry.get("blockTime").and_then(Value::as_i64),
            ))
        })
        .collect()
}

/// Parse a `getTransaction` result with `jsonParsed` encoding
pub fn parse_transaction(
    signature: &str,
    result: &Value,
) -> Result<ParsedTransaction, LedgerClientError> {
    let meta = result.get("meta").filter(|meta| !meta.is_null());
    let message = result
        .get("transaction")
        .and_then(|tx| tx.get("message"))
        .ok_or_else(|| {
            LedgerClientError::ParseError(format!("Transaction {} has no message", signature))
        })?;

    // A missing meta means we cannot tell whether it succeeded
    let failed = meta
        .map(|meta| meta.get("err").map(|err| !err.is_null()).unwrap_or(false))
        .unwrap_or(true);

    let log_messages = meta
        .and_then(|meta| meta.get("logMessages"))
        .and_then(Value::as_array)
        .map(|logs| {
            logs.iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    let account_keys = message
        .get("accountKeys")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(account_key).collect())
        .unwrap_or_default();

    let instructions = message
        .get("instructions")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(parse_instruction).collect())
        .unwrap_or_default();

    Ok(ParsedTransaction {
        signature: signature.to_string(),
        block_time: result.get("blockTime").and_then(Value::as_i64),
        failed,
        log_messages,
        account_keys,
        instructions,
    })
}

/// Keys are objects under `jsonParsed`, plain strings otherwise
fn account_key(value: &Value) -> Option<String> {
    match value {
        Value::String(key) => Some(key.clone()),
        Value::Object(_) => value
            .get("pubkey")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        _ => None,
    }
}

fn parse_instruction(value: &Value) -> Option<ParsedInstruction> {
    let program_id = value.get("programId").and_then(Value::as_str)?;

    if let Some(parsed) = value.get("parsed").filter(|parsed| !parsed.is_null()) {
        return Some(ParsedInstruction::parsed(program_id, parsed.clone()));
    }

    // jsonParsed leaves unknown instructions as base58 data
    value
        .get("data")
        .and_then(Value::as_str)
        .map(|data| ParsedInstruction::raw(program_id, data, PayloadEncoding::Base58))
}

/// Parse a WebSocket text frame from a `logsSubscribe` subscription.
/// Subscription acknowledgements and unrelated frames yield `None`.
pub fn parse_logs_notification(text: &str) -> Option<Result<LogNotification, LedgerClientError>> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            logging::log_debug(&format!("Skipping invalid ws message json: {}", error));
            return None;
        }
    };

    if let Some(error) = value.get("error") {
        return Some(Err(LedgerClientError::RpcError(error.to_string())));
    }

    if let (Some(id), Some(result)) = (value.get("id"), value.get("result")) {
        logging::log_debug(&format!(
            "logsSubscribe acknowledged (request {}, subscription {})",
            id, result
        ));
        return None;
    }

    if value.get("method").and_then(Value::as_str) != Some("logsNotification") {
        return None;
    }

    let event = value.get("params")?.get("result")?.get("value")?;
    let signature = event.get("signature")?.as_str()?.to_string();
    let logs_ok = event.get("err").map(Value::is_null).unwrap_or(true);

    Some(Ok(LogNotification { signature, logs_ok }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_transaction_json_parsed() {
        let result = json!({
            "blockTime": 1_700_000_123,
            "meta": {
                "err": null,
                "logMessages": ["Program log: Instruction: Stake"]
            },
            "transaction": {
                "message": {
                    "accountKeys": [
                        {"pubkey": "Payer111", "signer": true, "writable": true},
                        {"pubkey": "Prog222", "signer": false, "writable": false}
                    ],
                    "instructions": [
                        {"programId": "Prog222", "accounts": [], "data": "3Bxs4h24hBtQy9rw"},
                        {"programId": "11111111111111111111111111111111", "program": "system",
                         "parsed": {"type": "transfer", "info": {"lamports": 5}}}
                    ]
                }
            }
        });

        let tx = parse_transaction("sigA", &result).unwrap();
        assert!(!tx.failed);
        assert_eq!(tx.block_time, Some(1_700_000_123));
        assert_eq!(tx.fee_payer(), Some("Payer111"));
        assert_eq!(tx.log_messages.len(), 1);
        assert_eq!(
            tx.instructions[0],
            ParsedInstruction::raw("Prog222", "3Bxs4h24hBtQy9rw", PayloadEncoding::Base58)
        );
        assert!(matches!(
            tx.instructions[1].payload,
            crate::domain::models::InstructionPayload::Parsed(_)
        ));
    }

    #[test]
    fn test_parse_transaction_with_error_is_failed() {
        let result = json!({
            "meta": {"err": {"InstructionError": [0, "Custom"]}, "logMessages": []},
            "transaction": {"message": {"accountKeys": ["Payer"], "instructions": []}}
        });
        let tx = parse_transaction("sigB", &result).unwrap();
        assert!(tx.failed);
        assert_eq!(tx.account_keys, vec!["Payer".to_string()]);
    }

    #[test]
    fn test_parse_signature_page() {
        let page = parse_signature_page(&json!([
            {"signature": "s2", "blockTime": 20, "err": null},
            {"signature": "s1", "blockTime": null}
        ]))
        .unwrap();
        assert_eq!(
            page,
            vec![SignatureInfo::new("s2", Some(20)), SignatureInfo::new("s1", None)]
        );
    }

    #[test]
    fn test_parse_logs_notification() {
        let text = json!({
            "jsonrpc": "2.0",
            "method": "logsNotification",
            "params": {
                "result": {
                    "context": {"slot": 5},
                    "value": {"signature": "liveSig", "err": null, "logs": []}
                },
                "subscription": 7
            }
        })
        .to_string();
        let notification = parse_logs_notification(&text).unwrap().unwrap();
        assert_eq!(notification.signature, "liveSig");
        assert!(notification.logs_ok);

        let failed = text.replace("\"err\":null", "\"err\":{\"InstructionError\":[0,\"Custom\"]}");
        assert!(!parse_logs_notification(&failed).unwrap().unwrap().logs_ok);
    }

    #[test]
    fn test_parse_logs_ack_and_garbage() {
        assert!(parse_logs_notification(r#"{"jsonrpc":"2.0","result":7,"id":1}"#).is_none());
        assert!(parse_logs_notification("not json").is_none());
        assert!(matches!(
            parse_logs_notification(r#"{"jsonrpc":"2.0","error":{"code":-32602},"id":1}"#),
            Some(Err(LedgerClientError::RpcError(_)))
        ));
    }
}
