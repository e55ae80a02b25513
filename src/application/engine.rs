//! Wires the backfill and the live feed to one idempotent store

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::application::backfill::BackfillCoordinator;
use crate::application::live::LiveIngestor;
use crate::application::retry_handler::RetryHandler;
use crate::config::AppConfig;
use crate::domain::services::{EventService, TransactionClassifier};
use crate::infrastructure::persistence::repositories::EventRepository;
use crate::infrastructure::solana::LedgerClient;
use crate::utils::logging;

/// Runs historical backfill and live ingestion side by side. The two paths
/// share nothing but the store; its uniqueness on signature is what keeps
/// overlapping deliveries from creating duplicates.
pub struct IngestionEngine {
    event_service: Arc<EventService>,
    backfill: Arc<BackfillCoordinator>,
    live: Arc<LiveIngestor>,
    reconnect_delay: Duration,
    tasks: Vec<JoinHandle<()>>,
}

impl IngestionEngine {
    pub fn new(
        config: &AppConfig,
        ledger: Arc<dyn LedgerClient>,
        repository: EventRepository,
    ) -> Self {
        let program_id = config.indexer.program_id.clone();
        let event_service = Arc::new(EventService::new(
            ledger.clone(),
            repository,
            TransactionClassifier::new(program_id.clone()),
        ));

        let backfill = Arc::new(BackfillCoordinator::new(
            ledger.clone(),
            event_service.clone(),
            program_id.clone(),
            config.indexer.start_signature.clone(),
            config.indexer.backfill_page_size,
            RetryHandler::with_config(
                config.solana.max_retries,
                config.solana.retry_base_delay_ms,
            ),
        ));

        let live = Arc::new(LiveIngestor::new(ledger, event_service.clone(), program_id));

        Self {
            event_service,
            backfill,
            live,
            reconnect_delay: Duration::from_millis(config.indexer.live_reconnect_delay_ms),
            tasks: Vec::new(),
        }
    }

    /// Entry point for manual submissions and read queries
    pub fn event_service(&self) -> Arc<EventService> {
        self.event_service.clone()
    }

    pub fn backfill(&self) -> Arc<BackfillCoordinator> {
        self.backfill.clone()
    }

    /// Spawn the backfill and the supervised live feed
    pub fn start(&mut self) {
        let backfill = self.backfill.clone();
        self.tasks.push(tokio::spawn(async move {
            // Skips are already logged by the coordinator
            let _ = backfill.start().await;
        }));

        let live = self.live.clone();
        let reconnect_delay = self.reconnect_delay;
        self.tasks.push(tokio::spawn(async move {
            Self::supervise_live(live, reconnect_delay).await;
        }));

        logging::log_info("Ingestion engine started");
    }

    /// Keep the live feed subscribed, waiting between attempts
    async fn supervise_live(live: Arc<LiveIngestor>, reconnect_delay: Duration) {
        loop {
            if let Err(e) = live.run().await {
                logging::log_error(&format!(
                    "Live subscription stopped: {}. Reconnecting in {}ms",
                    e,
                    reconnect_delay.as_millis()
                ));
            }
            sleep(reconnect_delay).await;
        }
    }

    /// Abort all running tasks
    pub async fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
        logging::log_info("Ingestion engine stopped");
    }
}
