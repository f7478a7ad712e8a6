//! Price history store interface

use rust_decimal::Decimal;

use crate::shared::errors::HistoryError;
use crate::shared::types::PriceRecord;

/// Append-only log of observed prices, keyed by product name.
///
/// Records are never mutated, deduplicated or deleted. Aggregates only ever
/// look at the records of the requested product.
pub trait HistoryStore {
    /// Append one observation stamped with the current time.
    ///
    /// Negative prices and prices above [`super::MAX_PRICE`] are rejected with
    /// [`HistoryError::InvalidPrice`] and nothing is stored.
    fn record(&mut self, product: &str, price: Decimal, url: &str) -> Result<(), HistoryError>;

    /// Lowest price ever recorded for `product`.
    fn minimum(&self, product: &str) -> Result<Option<Decimal>, HistoryError>;

    /// Mean of the `window` most recent prices of `product`, newest first.
    fn rolling_average(&self, product: &str, window: usize) -> Result<Option<Decimal>, HistoryError>;

    /// Up to `limit` records of `product`, newest first.
    fn recent(&self, product: &str, limit: usize) -> Result<Vec<PriceRecord>, HistoryError>;

    fn count(&self, product: &str) -> Result<usize, HistoryError>;
}
