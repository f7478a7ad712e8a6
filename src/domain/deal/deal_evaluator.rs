//! Deal detection against a product's thresholds and its price history

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::history::HistoryStore;
use crate::shared::config::DEFAULT_ROLLING_WINDOW;
use crate::shared::errors::HistoryError;
use crate::shared::types::{DealResult, ProductWatch};
use crate::shared::utils::{calculate_discount_pct, format_pct, format_price};

/// Records the current price and checks both alert criteria
#[derive(Debug, Clone, Copy)]
pub struct DealEvaluator {
    window: usize,
}

impl Default for DealEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_ROLLING_WINDOW)
    }
}

impl DealEvaluator {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Evaluate one product.
    ///
    /// The price is recorded before anything else, so history grows whether
    /// or not a deal is found. Alerts come out fixed-threshold first, then
    /// discount.
    pub fn evaluate<S: HistoryStore + ?Sized>(
        &self,
        watch: &ProductWatch,
        current_price: Decimal,
        store: &mut S,
    ) -> Result<Option<DealResult>, HistoryError> {
        store.record(&watch.name, current_price, &watch.url)?;
        info!("  Current price: ${}", format_price(current_price));

        let mut alerts = Vec::new();

        if let Some(target) = watch.target_price {
            if current_price <= target {
                alerts.push(format!(
                    "Below target price! ${} ≤ ${}",
                    format_price(current_price),
                    format_price(target)
                ));
            }
        }

        if let Some(min_discount) = watch.min_discount_pct.filter(|pct| *pct > Decimal::ZERO) {
            let average = store.rolling_average(&watch.name, self.window)?;
            match average.and_then(|avg| calculate_discount_pct(avg, current_price).map(|pct| (avg, pct))) {
                Some((avg, discount)) => {
                    info!(
                        "  Historical avg: ${} | Discount: {}%",
                        format_price(avg),
                        format_pct(discount)
                    );
                    if discount >= min_discount {
                        alerts.push(format!(
                            "{}% below historical average! (was ${}, now ${})",
                            format_pct(discount),
                            format_price(avg),
                            format_price(current_price)
                        ));
                    }
                }
                None => info!("  Not enough history to calculate discount yet."),
            }
        }

        if alerts.is_empty() {
            return Ok(None);
        }

        Ok(Some(DealResult {
            name: watch.name.clone(),
            url: watch.url.clone(),
            current_price,
            alerts,
        }))
    }
}
