use log::{debug, error, info, warn};

/// Initialize the logger, defaulting to `info` when `RUST_LOG` is unset
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Log an informational message
pub fn log_info(message: &str) {
    info!("{}", message);
}

/// Log a debug message
pub fn log_debug(message: &str) {
    debug!("{}", message);
}

/// Log a warning message
pub fn log_warning(message: &str) {
    warn!("{}", message);
}

/// Log an error message
pub fn log_error(message: &str) {
    error!("{}", message);
}

/// Shorten a signature for log lines
pub fn short_signature(signature: &str) -> &str {
    match signature.char_indices().nth(8) {
        Some((idx, _)) => &signature[..idx],
        None => signature,
    }
}

/// Log the endpoints the indexer talks to
pub fn log_solana_connection_details(network: &str, rpc_url: &str, ws_url: &str) {
    info!(
        "Solana connection details for {}: rpc={} ws={}",
        network, rpc_url, ws_url
    );
}
