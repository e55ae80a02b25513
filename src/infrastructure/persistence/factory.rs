use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{EventRepository, Repositories};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(Self::create_event_repository(conn))
    }

    /// Create an event repository
    pub fn create_event_repository(conn: DatabaseConnection) -> EventRepository {
        EventRepository::new(conn)
    }
}
