//! Ingestion orchestration: historical backfill, live feed and the engine
//! that runs both.

pub mod backfill;
pub mod engine;
pub mod live;
pub mod retry_handler;

pub use backfill::{BackfillCoordinator, BackfillReport, BackfillSkipped};
pub use engine::IngestionEngine;
pub use live::LiveIngestor;
pub use retry_handler::RetryHandler;
