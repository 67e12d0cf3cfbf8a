use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The record has no remote identifier, so the gateway cannot address it.
    #[error("object has not been synchronized with the gateway yet")]
    NotSynchronized,
    #[error("linked customer has no remote identifier")]
    MissingCustomer,
    #[error("linked card has no remote identifier")]
    MissingCard,
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} {1} not found in the local store")]
    NotFound(&'static str, u64),
    #[error("gateway rejected the request: {0}")]
    Gateway(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid remote timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("invalid remote amount: {0}")]
    Amount(#[from] rust_decimal::Error),
    #[cfg(feature = "gateway-http")]
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}
