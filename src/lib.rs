//! Pricewatch - product price history and deal alerts
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use domain::deal::DealEvaluator;
pub use domain::history::{HistoryStore, InMemoryHistoryStore};
pub use infrastructure::storage::SqliteHistoryStore;
pub use shared::types::{DealResult, PriceRecord, ProductWatch};
