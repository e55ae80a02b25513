mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockLedger, PROGRAM_ID};
use stake_indexer::application::IngestionEngine;
use stake_indexer::config::{
    AppConfig, DatabaseConfig, IndexerConfig, SolanaConfig, SolanaNetwork,
};
use stake_indexer::domain::models::{EventType, LogNotification, SignatureInfo};

fn test_config(start_signature: Option<&str>) -> AppConfig {
    AppConfig {
        solana: SolanaConfig {
            network: SolanaNetwork::Localnet,
            rpc_url: "http://127.0.0.1:8899".to_string(),
            ws_url: "ws://127.0.0.1:8900".to_string(),
            commitment: "confirmed".to_string(),
            max_retries: 2,
            retry_base_delay_ms: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        indexer: IndexerConfig {
            program_id: PROGRAM_ID.to_string(),
            start_signature: start_signature.map(ToString::to_string),
            backfill_page_size: 2,
            live_reconnect_delay_ms: 10,
        },
    }
}

fn notification(signature: &str) -> LogNotification {
    LogNotification {
        signature: signature.to_string(),
        logs_ok: true,
    }
}

#[tokio::test]
async fn test_backfill_and_live_overlap_store_each_signature_once() {
    let history = vec![
        SignatureInfo::new("tip", Some(1_700_000_300)),
        SignatureInfo::new("middle", Some(1_700_000_200)),
        SignatureInfo::new("start", Some(1_700_000_100)),
        SignatureInfo::new("before-start", Some(1_700_000_000)),
    ];
    // Live delivers the tip again plus a fresh signature, twice over
    let ledger = MockLedger::new()
        .with_history(history)
        .with_subscription(vec![notification("tip"), notification("fresh")])
        .with_subscription(vec![notification("fresh"), notification("middle")]);
    for signature in ["tip", "middle", "start", "before-start", "fresh"] {
        ledger.put_transaction(common::stake_tx(signature, 10));
    }
    let ledger = Arc::new(ledger);

    let mut engine = IngestionEngine::new(
        &test_config(Some("start")),
        ledger.clone(),
        common::setup_repository().await,
    );
    let service = engine.event_service();
    engine.start();

    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let count = service.count_by_type(EventType::Stake).await.unwrap();
            if count == 4 && !engine.backfill().is_running() && ledger.fetched().len() >= 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(settled.is_ok(), "engine did not ingest the expected events");

    // Give the second subscription time to be consumed
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.shutdown().await;

    let events = service.recent_events(None).await.unwrap();
    let mut signatures: Vec<&str> = events.iter().map(|e| e.signature.as_str()).collect();
    signatures.sort_unstable();
    assert_eq!(signatures, vec!["fresh", "middle", "start", "tip"]);
    assert!(service
        .repository()
        .find_by_signature("before-start")
        .await
        .unwrap()
        .is_none());

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_staked_events, 4);
    assert_eq!(stats.total_unstaked_events, 0);
}

#[tokio::test]
async fn test_engine_without_checkpoint_runs_live_only() {
    let ledger = MockLedger::new()
        .with_history(vec![SignatureInfo::new("old", Some(1))])
        .with_subscription(vec![notification("live-only")]);
    ledger.put_transaction(common::stake_tx("old", 1));
    ledger.put_transaction(common::stake_tx("live-only", 5));
    let ledger = Arc::new(ledger);

    let mut engine = IngestionEngine::new(
        &test_config(None),
        ledger.clone(),
        common::setup_repository().await,
    );
    let service = engine.event_service();
    engine.start();

    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if service.count_by_type(EventType::Stake).await.unwrap() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(settled.is_ok());
    engine.shutdown().await;

    assert!(ledger.page_cursors().is_empty());
    assert_eq!(ledger.fetched(), vec!["live-only".to_string()]);
}
