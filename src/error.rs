use thiserror::Error;

#[derive(Error, Debug)]
pub enum PurchaseError {
    #[error("Invalid purchase: {0}")]
    InvalidPurchase(String),
    #[error("payment provider is not available on this device")]
    ProviderUnavailable,
    #[error("Payment session failed")]
    SessionFailed,
    #[error("Payment session was cancelled")]
    SessionCancelled,
    #[error("Purchase flow has already been started")]
    FlowAlreadyStarted,
    #[error("Action not available: {0}")]
    InvalidAction(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PurchaseError {
    fn from(err: rocksdb::Error) -> Self {
        PurchaseError::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for PurchaseError {
    fn from(err: serde_json::Error) -> Self {
        PurchaseError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PurchaseError>;
