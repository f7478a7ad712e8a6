pub mod http_fetcher;
pub mod price_extractor;

pub use http_fetcher::HttpPriceFetcher;
pub use price_extractor::{extract_price, parse_price};

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Source of current prices
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Current price at `url`, or `None` when it cannot be obtained.
    ///
    /// Failures are logged and absorbed; they never cross this boundary.
    async fn fetch(&self, url: &str) -> Option<Decimal>;
}
