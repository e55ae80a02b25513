//! Historical replay from the chain tip back to a checkpoint signature

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::retry_handler::RetryHandler;
use crate::domain::models::SignatureInfo;
use crate::domain::services::{EventService, IngestOutcome};
use crate::infrastructure::solana::LedgerClient;
use crate::utils::logging;

/// Summary of one backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// History pages requested from the ledger
    pub pages_scanned: usize,
    /// Whether the checkpoint signature was found
    pub reached_checkpoint: bool,
    /// Signatures handed to ingestion
    pub processed: usize,
    pub created: usize,
    pub repaired: usize,
    pub failed: usize,
}

/// Why `start` did not run a backfill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillSkipped {
    NoCheckpoint,
    AlreadyRunning,
}

/// Clears the running flag however the run ends
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Walks signature history backwards until the checkpoint, then replays
/// the window oldest-first through the event service
#[derive(Debug)]
pub struct BackfillCoordinator {
    ledger: Arc<dyn LedgerClient>,
    event_service: Arc<EventService>,
    program_id: String,
    checkpoint: Option<String>,
    page_size: usize,
    retry_handler: RetryHandler,
    running: AtomicBool,
}

impl BackfillCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        event_service: Arc<EventService>,
        program_id: String,
        checkpoint: Option<String>,
        page_size: usize,
        retry_handler: RetryHandler,
    ) -> Self {
        Self {
            ledger,
            event_service,
            program_id,
            checkpoint,
            page_size: page_size.max(1),
            retry_handler,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run a backfill unless one is already in flight. Overlapping calls
    /// are dropped, not queued.
    pub async fn start(&self) -> Result<BackfillReport, BackfillSkipped> {
        let checkpoint = match self.checkpoint.as_deref() {
            Some(checkpoint) => checkpoint,
            None => {
                logging::log_info(
                    "No START_TRANSACTION_SIGNATURE provided, skipping historical fetch",
                );
                return Err(BackfillSkipped::NoCheckpoint);
            }
        };

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            logging::log_info("Already processing historical transactions");
            return Err(BackfillSkipped::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        logging::log_info(&format!(
            "📜 Fetching historical transactions back to: {}",
            checkpoint
        ));

        let mut report = BackfillReport::default();
        let window = match self.collect_window(checkpoint, &mut report).await {
            Some(window) => window,
            None => return Ok(report),
        };

        // The window is newest-first; replay oldest-first
        for info in window.iter().rev() {
            self.replay(info, &mut report).await;
        }

        logging::log_info(&format!(
            "✅ Processed {} historical transactions ({} new, {} amounts repaired, {} failed)",
            report.processed, report.created, report.repaired, report.failed
        ));

        Ok(report)
    }

    /// Page backwards until the page holding the checkpoint. Returns every
    /// signature from the tip down to the checkpoint inclusive, newest-first,
    /// or `None` when the checkpoint was never seen.
    ///
    /// Only the signature and block time of each entry are held, so memory
    /// grows linearly with the distance between the tip and the checkpoint
    /// (roughly 100 bytes per signature, about 100 MB for a checkpoint a
    /// million transactions deep).
    async fn collect_window(
        &self,
        checkpoint: &str,
        report: &mut BackfillReport,
    ) -> Option<Vec<SignatureInfo>> {
        let mut window = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let ledger = &self.ledger;
            let program_id = self.program_id.as_str();
            let cursor = before.as_deref();
            let page_size = self.page_size;

            let page = match self
                .retry_handler
                .execute_with_retry(
                    move || ledger.list_signatures(program_id, cursor, page_size),
                    "getSignaturesForAddress",
                )
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    logging::log_error(&format!(
                        "Error fetching historical transactions: {}",
                        e
                    ));
                    return None;
                }
            };

            if page.is_empty() {
                logging::log_warning(&format!(
                    "History exhausted after {} pages without reaching {}",
                    report.pages_scanned, checkpoint
                ));
                return None;
            }
            report.pages_scanned += 1;

            if let Some(position) = page.iter().position(|info| info.signature == checkpoint) {
                window.extend(page.into_iter().take(position + 1));
                report.reached_checkpoint = true;
                return Some(window);
            }

            before = page.last().map(|info| info.signature.clone());
            window.extend(page);
        }
    }

    async fn replay(&self, info: &SignatureInfo, report: &mut BackfillReport) {
        report.processed += 1;

        match self
            .event_service
            .ingest_signature(&info.signature, info.block_time)
            .await
        {
            Ok(IngestOutcome::Created(_)) => report.created += 1,
            Ok(IngestOutcome::AmountRepaired(_)) => report.repaired += 1,
            Ok(IngestOutcome::AlreadyExists) | Ok(IngestOutcome::Skipped(_)) => {}
            Err(e) => {
                report.failed += 1;
                logging::log_error(&format!(
                    "Error processing transaction {}: {}",
                    info.signature, e
                ));
            }
        }
    }
}
