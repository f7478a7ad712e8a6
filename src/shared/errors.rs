//! Error handling for the application

use rust_decimal::Decimal;
use thiserror::Error;

/// Price history errors
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Invalid price {price} for {product}: prices must be between 0 and 1000000000000")]
    InvalidPrice { product: String, price: Decimal },

    #[error("Storage unavailable: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Corrupt history row: {0}")]
    CorruptRecord(String),
}

impl HistoryError {
    /// Storage failures invalidate every later aggregate, so they end the cycle
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HistoryError::InvalidPrice { .. })
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Notification errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Notification task failed: {0}")]
    Task(String),
}
