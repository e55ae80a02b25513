use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::AppConfig;
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

/// Manages database connection pool
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Creates a new database connection pool
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        Self::connect(&config.database.url).await
    }

    /// Connect to the given database URL
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        logging::log_info(&format!("Connecting to database: {}", url));

        let mut options = ConnectOptions::new(url.to_string());
        options.sqlx_logging(false);
        // An in-memory SQLite database lives and dies with its connection
        if url.starts_with("sqlite::memory:") {
            options.max_connections(1).min_connections(1);
        }

        match Database::connect(options).await {
            Ok(connection) => {
                logging::log_info("Database connection established successfully");
                Ok(DbPool { connection })
            }
            Err(e) => {
                logging::log_error(&format!("Failed to connect to database: {}", e));
                Err(DbError::ConnectionError(format!(
                    "Failed to connect to database: {}",
                    e
                )))
            }
        }
    }

    /// Apply pending schema migrations
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        logging::log_info("Running database migrations...");
        Migrator::up(&self.connection, None).await?;
        Ok(())
    }

    /// Returns the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
