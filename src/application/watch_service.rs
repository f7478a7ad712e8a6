//! Check cycle and schedule loop

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::domain::deal::DealEvaluator;
use crate::domain::history::HistoryStore;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::scraper::PriceFetcher;
use crate::shared::config::WatcherConfig;
use crate::shared::errors::HistoryError;
use crate::shared::types::{DealResult, ProductWatch};

/// Outcome of one pass over all products
#[derive(Debug, Default)]
pub struct CycleReport {
    pub checked: usize,
    pub skipped: usize,
    pub deals: Vec<DealResult>,
}

/// Checks every configured product in order, one at a time
pub struct WatchService<S: HistoryStore> {
    products: Vec<ProductWatch>,
    evaluator: DealEvaluator,
    store: S,
    fetcher: Box<dyn PriceFetcher>,
    notifier: Box<dyn Notifier>,
    product_delay: Duration,
    check_interval: Duration,
}

impl<S: HistoryStore> WatchService<S> {
    pub fn new(
        config: &WatcherConfig,
        store: S,
        fetcher: Box<dyn PriceFetcher>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            products: config.products.clone(),
            evaluator: DealEvaluator::new(config.watcher.rolling_window),
            store,
            fetcher,
            notifier,
            product_delay: Duration::from_secs(config.watcher.product_delay_secs),
            check_interval: Duration::from_secs(config.watcher.check_interval_hours.saturating_mul(3600)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one check over all products and hand any deals to the notifier.
    ///
    /// A missing price or a rejected price only skips that product. A storage
    /// failure aborts the cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, HistoryError> {
        info!("{}", "=".repeat(50));
        info!("Starting check cycle...");
        let mut report = CycleReport::default();

        for (i, watch) in self.products.iter().enumerate() {
            if i > 0 && !self.product_delay.is_zero() {
                sleep(self.product_delay).await;
            }

            info!("Checking: {}", watch.name);
            let Some(price) = self.fetcher.fetch(&watch.url).await else {
                warn!("Skipping {} ({}): price unavailable", watch.name, watch.url);
                report.skipped += 1;
                continue;
            };

            match self.evaluator.evaluate(watch, price, &mut self.store) {
                Ok(Some(deal)) => {
                    report.checked += 1;
                    report.deals.push(deal);
                }
                Ok(None) => report.checked += 1,
                Err(e) if e.is_fatal() => {
                    error!("Aborting cycle at {} ({}): {}", watch.name, watch.url, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Skipping {} ({}): {}", watch.name, watch.url, e);
                    report.skipped += 1;
                }
            }
        }

        if report.deals.is_empty() {
            info!("No deals found this cycle.");
        } else {
            info!("🎉 {} deal(s) found! Sending notification...", report.deals.len());
            if let Err(e) = self.notifier.notify(&report.deals).await {
                error!("Failed to send notification: {}", e);
            }
        }

        Ok(report)
    }

    /// Run cycles until Ctrl-C or a storage failure
    pub async fn run_forever(&mut self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Run cycles until `shutdown` completes or storage fails.
    ///
    /// Shutdown is honoured both during a cycle and while waiting for the next one.
    /// A cycle cut short keeps whatever it already recorded.
    pub async fn run_until<F: Future>(&mut self, shutdown: F) -> Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.run_cycle() => {
                    result.context("check cycle aborted")?;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested during a cycle, stopping watcher");
                    return Ok(());
                }
            }

            info!("Next check in {} hour(s).", self.check_interval.as_secs() / 3600);
            tokio::select! {
                _ = sleep(self.check_interval) => {}
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping watcher");
                    return Ok(());
                }
            }
        }
    }
}
