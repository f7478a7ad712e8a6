//! SQLite-backed price history

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::history::{validate_price, HistoryStore};
use crate::shared::errors::HistoryError;
use crate::shared::types::PriceRecord;
use crate::shared::utils::mean;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS price_history (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        product     TEXT NOT NULL,
        price       TEXT NOT NULL,
        url         TEXT NOT NULL,
        observed_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_price_history_product
        ON price_history (product, observed_at);
";

/// Durable history. One connection is held for the lifetime of the store.
///
/// Prices are stored as decimal text, so aggregates are computed here rather
/// than with SQL `MIN`/`AVG`. Timestamps are fixed-width RFC 3339 (UTC, nanos)
/// so that text ordering matches time ordering.
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        info!("Database ready: {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Prices of `product`, newest first, optionally limited
    fn prices(&self, product: &str, limit: Option<usize>) -> Result<Vec<Decimal>, HistoryError> {
        let limit = limit.map_or(-1, |l| l as i64);
        let mut stmt = self.conn.prepare_cached(
            "SELECT price FROM price_history
             WHERE product = ?1
             ORDER BY observed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![product, limit], |row| row.get::<_, String>(0))?;

        let mut prices = Vec::new();
        for raw in rows {
            prices.push(parse_price(&raw?)?);
        }
        Ok(prices)
    }
}

fn parse_price(raw: &str) -> Result<Decimal, HistoryError> {
    Decimal::from_str(raw).map_err(|e| HistoryError::CorruptRecord(format!("price {:?}: {}", raw, e)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, HistoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| HistoryError::CorruptRecord(format!("timestamp {:?}: {}", raw, e)))
}

impl HistoryStore for SqliteHistoryStore {
    fn record(&mut self, product: &str, price: Decimal, url: &str) -> Result<(), HistoryError> {
        validate_price(product, price)?;
        let record = PriceRecord::new(product, price, url);

        self.conn.execute(
            "INSERT INTO price_history (product, price, url, observed_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.product,
                record.price.to_string(),
                record.url,
                record.observed_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;

        Ok(())
    }

    fn minimum(&self, product: &str) -> Result<Option<Decimal>, HistoryError> {
        Ok(self.prices(product, None)?.into_iter().min())
    }

    fn rolling_average(&self, product: &str, window: usize) -> Result<Option<Decimal>, HistoryError> {
        if window == 0 {
            return Ok(None);
        }
        Ok(mean(&self.prices(product, Some(window))?))
    }

    fn recent(&self, product: &str, limit: usize) -> Result<Vec<PriceRecord>, HistoryError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT product, price, url, observed_at FROM price_history
             WHERE product = ?1
             ORDER BY observed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![product, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (product, price, url, observed_at) = row?;
            records.push(PriceRecord {
                product,
                price: parse_price(&price)?,
                url,
                observed_at: parse_timestamp(&observed_at)?,
            });
        }
        Ok(records)
    }

    fn count(&self, product: &str) -> Result<usize, HistoryError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM price_history WHERE product = ?1",
            params![product],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn temp_db_path() -> std::path::PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("pricewatch-test-{}-{}.db", std::process::id(), nanos))
    }

    #[test]
    fn test_minimum_per_product() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        assert_eq!(store.minimum("laptop").unwrap(), None);

        store.record("laptop", d("799.99"), "u1").unwrap();
        store.record("ssd", d("49.00"), "u2").unwrap();
        store.record("laptop", d("749.50"), "u1").unwrap();
        store.record("laptop", d("1299.90"), "u1").unwrap();

        assert_eq!(store.minimum("laptop").unwrap(), Some(d("749.50")));
        assert_eq!(store.minimum("ssd").unwrap(), Some(d("49.00")));
        // reads are idempotent
        assert_eq!(store.minimum("laptop").unwrap(), store.minimum("laptop").unwrap());
    }

    #[test]
    fn test_rolling_average_window() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        assert_eq!(store.rolling_average("p", 30).unwrap(), None);

        for price in ["10", "20", "30"] {
            store.record("p", d(price), "u").unwrap();
        }
        store.record("other", d("1000"), "u").unwrap();
        assert_eq!(store.rolling_average("p", 30).unwrap(), Some(d("20")));

        for _ in 0..30 {
            store.record("p", d("5"), "u").unwrap();
        }
        assert_eq!(store.rolling_average("p", 30).unwrap(), Some(d("5")));
        assert_eq!(store.rolling_average("p", 0).unwrap(), None);
    }

    #[test]
    fn test_rejects_negative_price() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        let err = store.record("p", d("-0.01"), "u").unwrap_err();
        assert!(matches!(err, HistoryError::InvalidPrice { .. }));
        assert_eq!(store.count("p").unwrap(), 0);
    }

    #[test]
    fn test_prices_keep_exact_decimals() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        store.record("p", d("0.10"), "u").unwrap();
        store.record("p", d("0.20"), "u").unwrap();
        assert_eq!(store.rolling_average("p", 30).unwrap(), Some(d("0.15")));
    }

    #[test]
    fn test_recent_records() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        store.record("p", d("3"), "https://example.com/p").unwrap();
        store.record("p", d("2"), "https://example.com/p").unwrap();
        store.record("p", d("1"), "https://example.com/p").unwrap();

        let recent = store.recent("p", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].price, d("1"));
        assert_eq!(recent[1].price, d("2"));
        assert_eq!(recent[0].url, "https://example.com/p");
        assert!(recent[0].observed_at >= recent[1].observed_at);
    }

    #[test]
    fn test_survives_reopen() {
        let path = temp_db_path();
        {
            let mut store = SqliteHistoryStore::open(&path).unwrap();
            store.record("p", d("12.34"), "u").unwrap();
            store.record("p", d("10.00"), "u").unwrap();
        }
        {
            let store = SqliteHistoryStore::open(&path).unwrap();
            assert_eq!(store.count("p").unwrap(), 2);
            assert_eq!(store.minimum("p").unwrap(), Some(d("10.00")));
        }
        let _ = std::fs::remove_file(&path);
    }
}
