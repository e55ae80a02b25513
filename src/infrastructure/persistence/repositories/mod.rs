pub mod event_repository;

pub use event_repository::{EventRepository, DEFAULT_RECENT_LIMIT};

/// Collection of all repositories
pub struct Repositories {
    /// Repository for event operations
    pub event: EventRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(event: EventRepository) -> Self {
        Self { event }
    }
}
