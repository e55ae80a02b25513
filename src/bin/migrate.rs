use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use stake_indexer::utils::logging;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    logging::init_logger();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    logging::log_info("Running database migrations...");

    let connection = Database::connect(&database_url)
        .await
        .with_context(|| format!("failed to connect to {}", database_url))?;

    Migrator::up(&connection, None).await?;

    logging::log_info("Migrations completed successfully!");

    Ok(())
}
