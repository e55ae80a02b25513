//! Live ingestion from the program's log subscription

use futures::StreamExt;
use std::sync::Arc;

use crate::domain::errors::IngestionError;
use crate::domain::services::EventService;
use crate::infrastructure::solana::{LedgerClient, LedgerClientError};
use crate::utils::logging;

#[derive(Debug)]
pub struct LiveIngestor {
    ledger: Arc<dyn LedgerClient>,
    event_service: Arc<EventService>,
    program_id: String,
}

impl LiveIngestor {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        event_service: Arc<EventService>,
        program_id: String,
    ) -> Self {
        Self {
            ledger,
            event_service,
            program_id,
        }
    }

    /// Consume one subscription until it fails or ends. Always returns an
    /// error describing why the feed stopped; the caller decides whether to
    /// subscribe again. Replaying seen signatures is harmless.
    pub async fn run(&self) -> Result<(), IngestionError> {
        let mut notifications = self.ledger.subscribe_logs(&self.program_id).await?;
        logging::log_info(&format!(
            "👂 Listening for new events on program: {}",
            self.program_id
        ));

        while let Some(notification) = notifications.next().await {
            let notification = notification?;
            if !notification.logs_ok {
                logging::log_debug(&format!(
                    "Ignoring failed transaction {}",
                    notification.signature
                ));
                continue;
            }

            logging::log_info(&format!("🔔 New transaction: {}", notification.signature));

            if let Err(e) = self
                .event_service
                .ingest_signature(&notification.signature, None)
                .await
            {
                logging::log_error(&format!(
                    "Error processing transaction {}: {}",
                    notification.signature, e
                ));
            }
        }

        Err(LedgerClientError::SubscriptionClosed("log stream ended".to_string()).into())
    }
}
