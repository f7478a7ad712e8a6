//! Volatile history store, used for dry runs and tests

use rust_decimal::Decimal;

use super::{validate_price, HistoryStore};
use crate::shared::errors::HistoryError;
use crate::shared::types::PriceRecord;
use crate::shared::utils::mean;

/// Keeps every record in insertion order; nothing survives the process
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: Vec<PriceRecord>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first<'a>(&'a self, product: &'a str) -> impl Iterator<Item = &'a PriceRecord> + 'a {
        self.records.iter().rev().filter(move |r| r.product == product)
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn record(&mut self, product: &str, price: Decimal, url: &str) -> Result<(), HistoryError> {
        validate_price(product, price)?;
        self.records.push(PriceRecord::new(product, price, url));
        Ok(())
    }

    fn minimum(&self, product: &str) -> Result<Option<Decimal>, HistoryError> {
        Ok(self.newest_first(product).map(|r| r.price).min())
    }

    fn rolling_average(&self, product: &str, window: usize) -> Result<Option<Decimal>, HistoryError> {
        let prices: Vec<Decimal> = self.newest_first(product).take(window).map(|r| r.price).collect();
        Ok(mean(&prices))
    }

    fn recent(&self, product: &str, limit: usize) -> Result<Vec<PriceRecord>, HistoryError> {
        Ok(self.newest_first(product).take(limit).cloned().collect())
    }

    fn count(&self, product: &str) -> Result<usize, HistoryError> {
        Ok(self.newest_first(product).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_minimum_ignores_other_products() {
        let mut store = InMemoryHistoryStore::new();
        assert_eq!(store.minimum("laptop").unwrap(), None);

        store.record("laptop", d("799.99"), "u1").unwrap();
        store.record("ssd", d("49.00"), "u2").unwrap();
        store.record("laptop", d("749.50"), "u1").unwrap();
        store.record("laptop", d("820.00"), "u1").unwrap();

        assert_eq!(store.minimum("laptop").unwrap(), Some(d("749.50")));
        assert_eq!(store.minimum("ssd").unwrap(), Some(d("49.00")));
    }

    #[test]
    fn test_rolling_average_truncates_to_most_recent() {
        let mut store = InMemoryHistoryStore::new();
        // 10 old records at 1000, then 30 recent ones at 100
        for _ in 0..10 {
            store.record("p", d("1000"), "u").unwrap();
        }
        for _ in 0..30 {
            store.record("p", d("100"), "u").unwrap();
        }
        assert_eq!(store.rolling_average("p", 30).unwrap(), Some(d("100")));
        assert_eq!(store.rolling_average("p", 40).unwrap(), Some(d("325")));
    }

    #[test]
    fn test_rejects_negative_price() {
        let mut store = InMemoryHistoryStore::new();
        let err = store.record("p", d("-1"), "u").unwrap_err();
        assert!(matches!(err, HistoryError::InvalidPrice { .. }));
        assert!(!err.is_fatal());
        assert_eq!(store.count("p").unwrap(), 0);

        store.record("p", Decimal::ZERO, "u").unwrap();
        assert_eq!(store.count("p").unwrap(), 1);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut store = InMemoryHistoryStore::new();
        store.record("p", d("3"), "u").unwrap();
        store.record("p", d("2"), "u").unwrap();
        store.record("p", d("1"), "u").unwrap();

        let prices: Vec<Decimal> = store.recent("p", 2).unwrap().into_iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![d("1"), d("2")]);
    }
}
