use std::error::Error;
use std::fmt;

use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::solana::LedgerClientError;

/// Error type for event ingestion
#[derive(Debug)]
pub enum IngestionError {
    LedgerClientError(LedgerClientError),
    DbError(DbError),
    ValidationError(String),
}

impl fmt::Display for IngestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionError::LedgerClientError(e) => write!(f, "Ledger client error: {}", e),
            IngestionError::DbError(e) => write!(f, "Database error: {}", e),
            IngestionError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl Error for IngestionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IngestionError::LedgerClientError(e) => Some(e),
            IngestionError::DbError(e) => Some(e),
            IngestionError::ValidationError(_) => None,
        }
    }
}

impl From<LedgerClientError> for IngestionError {
    fn from(error: LedgerClientError) -> Self {
        IngestionError::LedgerClientError(error)
    }
}

impl From<DbError> for IngestionError {
    fn from(error: DbError) -> Self {
        IngestionError::DbError(error)
    }
}
