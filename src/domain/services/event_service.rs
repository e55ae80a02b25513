//! Idempotent ingestion of a single signature, shared by backfill, the live
//! feed and manual submissions.

use std::sync::Arc;

use crate::domain::errors::IngestionError;
use crate::domain::models::{
    Event, EventStats, EventSubmission, EventType, InsertOutcome, SubmitOutcome,
};
use crate::domain::services::classifier::TransactionClassifier;
use crate::infrastructure::persistence::repositories::{EventRepository, DEFAULT_RECENT_LIMIT};
use crate::infrastructure::solana::LedgerClient;
use crate::utils::logging;

/// Why a signature produced no event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    FailedOnChain,
    NotAStakingEvent,
    MissingFeePayer,
}

/// What ingesting one signature did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Created(Event),
    /// Row existed without an amount and one was recovered
    AmountRepaired(u64),
    /// Row existed (or a concurrent writer won) and nothing changed
    AlreadyExists,
    Skipped(SkipReason),
}

#[derive(Debug)]
pub struct EventService {
    ledger: Arc<dyn LedgerClient>,
    repository: EventRepository,
    classifier: TransactionClassifier,
}

impl EventService {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        repository: EventRepository,
        classifier: TransactionClassifier,
    ) -> Self {
        Self {
            ledger,
            repository,
            classifier,
        }
    }

    pub fn repository(&self) -> &EventRepository {
        &self.repository
    }

    /// Record the event for `signature` if it is a staking transaction.
    /// Safe to call any number of times and from concurrent tasks.
    pub async fn ingest_signature(
        &self,
        signature: &str,
        block_time_hint: Option<i64>,
    ) -> Result<IngestOutcome, IngestionError> {
        match self.repository.find_by_signature(signature).await? {
            Some(existing) if existing.has_amount() => Ok(IngestOutcome::AlreadyExists),
            Some(_) => self.repair_amount(signature).await,
            None => self.create_event(signature, block_time_hint).await,
        }
    }

    /// Re-run extraction for a stored event that has no amount yet
    async fn repair_amount(&self, signature: &str) -> Result<IngestOutcome, IngestionError> {
        let tx = match self.ledger.fetch_transaction(signature).await? {
            Some(tx) if !tx.failed => tx,
            _ => return Ok(IngestOutcome::AlreadyExists),
        };

        let amount = match self.classifier.classify(&tx).and_then(|c| c.amount) {
            Some(amount) => amount,
            None => return Ok(IngestOutcome::AlreadyExists),
        };

        if self.repository.backfill_amount(signature, amount).await? {
            logging::log_info(&format!(
                "💾 Updated amount for {}... = {}",
                logging::short_signature(signature),
                amount
            ));
            Ok(IngestOutcome::AmountRepaired(amount))
        } else {
            Ok(IngestOutcome::AlreadyExists)
        }
    }

    async fn create_event(
        &self,
        signature: &str,
        block_time_hint: Option<i64>,
    ) -> Result<IngestOutcome, IngestionError> {
        let tx = match self.ledger.fetch_transaction(signature).await? {
            Some(tx) => tx,
            None => return Ok(IngestOutcome::Skipped(SkipReason::NotFound)),
        };
        if tx.failed {
            return Ok(IngestOutcome::Skipped(SkipReason::FailedOnChain));
        }

        let classification = match self.classifier.classify(&tx) {
            Some(classification) => classification,
            None => return Ok(IngestOutcome::Skipped(SkipReason::NotAStakingEvent)),
        };
        let user = match tx.fee_payer() {
            Some(user) => user.to_string(),
            None => return Ok(IngestOutcome::Skipped(SkipReason::MissingFeePayer)),
        };

        let event = Event::new(
            signature.to_string(),
            classification.event_type,
            user,
            classification.amount,
            block_time_hint.or(tx.block_time),
        );

        match self.repository.insert_if_absent(&event).await? {
            InsertOutcome::Inserted => {
                logging::log_info(&format!(
                    "💾 Saved {} event: {}...{}",
                    event.event_type,
                    logging::short_signature(signature),
                    event
                        .amount
                        .map(|amount| format!(" (amount: {})", amount))
                        .unwrap_or_default()
                ));
                Ok(IngestOutcome::Created(event))
            }
            InsertOutcome::AlreadyExists(_) => {
                logging::log_debug(&format!(
                    "{} was stored concurrently",
                    logging::short_signature(signature)
                ));
                Ok(IngestOutcome::AlreadyExists)
            }
        }
    }

    /// Record an event reported by a client rather than observed on-chain.
    /// Follows the same rules: an existing row only ever gains a missing amount.
    pub async fn submit_event(
        &self,
        submission: EventSubmission,
    ) -> Result<SubmitOutcome, IngestionError> {
        if submission.event_type.is_empty()
            || submission.user.is_empty()
            || submission.signature.is_empty()
        {
            return Err(IngestionError::ValidationError(
                "Missing required fields: type, user, signature".to_string(),
            ));
        }
        let event_type = submission
            .event_type
            .parse::<EventType>()
            .map_err(IngestionError::ValidationError)?;
        let amount = submission.amount.filter(|amount| *amount > 0);

        if let Some(existing) = self.repository.find_by_signature(&submission.signature).await? {
            return self.update_submitted_amount(existing, amount).await;
        }

        let event = Event::new(
            submission.signature,
            event_type,
            submission.user,
            amount,
            submission.block_time,
        );

        match self.repository.insert_if_absent(&event).await? {
            InsertOutcome::Inserted => {
                logging::log_info(&format!(
                    "💾 Manually saved {} event: {}...",
                    event.event_type,
                    logging::short_signature(&event.signature)
                ));
                Ok(SubmitOutcome::Created(event))
            }
            InsertOutcome::AlreadyExists(existing) => {
                self.update_submitted_amount(existing, amount).await
            }
        }
    }

    async fn update_submitted_amount(
        &self,
        existing: Event,
        amount: Option<u64>,
    ) -> Result<SubmitOutcome, IngestionError> {
        let amount = match amount {
            Some(amount) if !existing.has_amount() => amount,
            _ => return Ok(SubmitOutcome::AlreadyExists(Some(existing))),
        };

        if !self.repository.backfill_amount(&existing.signature, amount).await? {
            // Someone else filled it in between the read and the update
            let current = self.repository.find_by_signature(&existing.signature).await?;
            return Ok(SubmitOutcome::AlreadyExists(current));
        }

        logging::log_info(&format!(
            "💾 Updated amount for existing event: {}... = {}",
            logging::short_signature(&existing.signature),
            amount
        ));
        Ok(SubmitOutcome::Updated(Event {
            amount: Some(amount),
            ..existing
        }))
    }

    /// Most recently recorded events, newest first. Without a limit the
    /// repository default applies.
    pub async fn recent_events(&self, limit: Option<u64>) -> Result<Vec<Event>, IngestionError> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        Ok(self.repository.find_recent(limit).await?)
    }

    pub async fn count_by_type(&self, event_type: EventType) -> Result<u64, IngestionError> {
        Ok(self.repository.count_by_type(event_type).await?)
    }

    pub async fn stats(&self) -> Result<EventStats, IngestionError> {
        Ok(self.repository.stats().await?)
    }
}
