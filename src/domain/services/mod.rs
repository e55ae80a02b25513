pub mod classifier;
pub mod event_service;

pub use classifier::{Classification, TransactionClassifier};
pub use event_service::{EventService, IngestOutcome, SkipReason};
