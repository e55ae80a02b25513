use std::sync::Arc;

use stake_indexer::application::IngestionEngine;
use stake_indexer::config::AppConfig;
use stake_indexer::infrastructure::persistence::{DbPool, RepositoryFactory};
use stake_indexer::infrastructure::solana::{LedgerClient, SolanaRpcClient};
use stake_indexer::utils::logging;

#[tokio::main]
async fn main() {
    logging::init_logger();

    logging::log_info(&format!(
        "Starting stake-indexer v{}",
        env!("CARGO_PKG_VERSION")
    ));

    let config = AppConfig::from_env();
    if let Err(e) = config.validate() {
        logging::log_error(&format!("Invalid configuration: {}", e));
        return;
    }

    logging::log_solana_connection_details(
        config.solana.network.name(),
        &config.solana.rpc_url,
        &config.solana.ws_url,
    );

    let db_pool = match DbPool::new(&config).await {
        Ok(db_pool) => db_pool,
        Err(e) => {
            logging::log_error(&format!("Failed to connect to database: {}", e));
            return;
        }
    };
    if let Err(e) = db_pool.run_migrations().await {
        logging::log_error(&format!("Failed to run migrations: {}", e));
        return;
    }

    let ledger: Arc<dyn LedgerClient> = match SolanaRpcClient::from_app_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            logging::log_error(&format!("Failed to create Solana client: {}", e));
            return;
        }
    };
    logging::log_info(&format!("🔧 Using {} provider", ledger.provider_name()));

    let repositories = RepositoryFactory::create_repositories(&db_pool);
    let mut engine = IngestionEngine::new(&config, ledger, repositories.event);
    engine.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        logging::log_error(&format!("Failed to listen for Ctrl+C: {}", e));
    }
    engine.shutdown().await;
}
