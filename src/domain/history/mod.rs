//! History domain - append-only price log and its aggregates

mod history_store;
mod in_memory_store;

pub use history_store::HistoryStore;
pub use in_memory_store::InMemoryHistoryStore;

use rust_decimal::Decimal;

use crate::shared::errors::HistoryError;

/// Largest price the history accepts: 1_000_000_000_000
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Rejects prices that would make the aggregates meaningless
pub fn validate_price(product: &str, price: Decimal) -> Result<(), HistoryError> {
    if price < Decimal::ZERO || price > MAX_PRICE {
        return Err(HistoryError::InvalidPrice {
            product: product.to_string(),
            price,
        });
    }
    Ok(())
}
