//! CLI commands and handlers
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use rust_decimal::Decimal;
use tracing::info;

use crate::application::watch_service::WatchService;
use crate::domain::history::{HistoryStore, InMemoryHistoryStore};
use crate::infrastructure::notify::notifier_from_settings;
use crate::infrastructure::scraper::HttpPriceFetcher;
use crate::infrastructure::storage::SqliteHistoryStore;
use crate::shared::config::{WatcherConfig, DEFAULT_CONFIG_PATH};
use crate::shared::types::PriceRecord;
use crate::shared::utils::format_price;

#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(version, about = "Product price watcher with deal alerts")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// SQLite history database (overrides watcher.db_path)
    #[arg(long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check prices on the configured schedule
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Keep history in memory only; nothing is written to the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the stored price history of a product
    History {
        /// Product name as configured
        product: String,

        /// Number of recent records to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct HistorySummary {
    product: String,
    records: usize,
    minimum: Option<Decimal>,
    rolling_average: Option<Decimal>,
    window: usize,
    recent: Vec<PriceRecord>,
}

pub struct CommandExecutor {
    config: WatcherConfig,
}

impl CommandExecutor {
    pub fn new(mut config: WatcherConfig, db_override: Option<String>) -> Self {
        if let Some(db) = db_override {
            config.watcher.db_path = db;
        }
        Self { config }
    }

    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Run { once, dry_run } => {
                if dry_run {
                    info!("Dry run: history is kept in memory only");
                    self.run(InMemoryHistoryStore::new(), once).await
                } else {
                    let store = SqliteHistoryStore::open(&self.config.watcher.db_path)
                        .with_context(|| format!("open history database {}", self.config.watcher.db_path))?;
                    self.run(store, once).await
                }
            }
            Commands::History { product, limit, json } => self.history(&product, limit, json),
        }
    }

    async fn run<S: HistoryStore>(&self, store: S, once: bool) -> Result<()> {
        if self.config.products.is_empty() {
            anyhow::bail!("no products configured");
        }
        for watch in self.config.products.iter().filter(|w| !w.has_criteria()) {
            info!("{} has no alert criteria; its price is only recorded", watch.name);
        }

        let fetcher = HttpPriceFetcher::new(&self.config.http)?;
        let notifier = notifier_from_settings(&self.config.email);
        let mut service = WatchService::new(&self.config, store, Box::new(fetcher), notifier);

        info!("Price Watcher started! Watching {} product(s)", self.config.products.len());
        if once {
            service.run_cycle().await.context("check cycle aborted")?;
            Ok(())
        } else {
            service.run_forever().await
        }
    }

    fn history(&self, product: &str, limit: usize, json: bool) -> Result<()> {
        let store = SqliteHistoryStore::open(&self.config.watcher.db_path)
            .with_context(|| format!("open history database {}", self.config.watcher.db_path))?;
        let window = self.config.watcher.rolling_window;

        let summary = HistorySummary {
            product: product.to_string(),
            records: store.count(product)?,
            minimum: store.minimum(product)?,
            rolling_average: store.rolling_average(product, window)?,
            window,
            recent: store.recent(product, limit)?,
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("📦 {} ({} record(s))", summary.product, summary.records);
        println!("   Lowest price:        {}", display_price(summary.minimum));
        println!("   Average of last {:<3}: {}", window, display_price(summary.rolling_average));
        for record in &summary.recent {
            println!(
                "   {}  ${}",
                record.observed_at.format("%Y-%m-%d %H:%M"),
                format_price(record.price)
            );
        }
        Ok(())
    }
}

fn display_price(price: Option<Decimal>) -> String {
    price.map_or_else(|| "n/a".to_string(), |p| format!("${}", format_price(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::ConfigLoader;

    #[test]
    fn test_parse_run_once() {
        let cli = Cli::try_parse_from(["pricewatch", "--db", "x.db", "run", "--once"]).unwrap();
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        assert!(matches!(cli.command, Commands::Run { once: true, dry_run: false }));
    }

    #[test]
    fn test_parse_history() {
        let cli = Cli::try_parse_from(["pricewatch", "history", "Kingston 1TB SSD", "-l", "3"]).unwrap();
        match cli.command {
            Commands::History { product, limit, json } => {
                assert_eq!(product, "Kingston 1TB SSD");
                assert_eq!(limit, 3);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_db_override() {
        let config = ConfigLoader::from_toml("").unwrap();
        let executor = CommandExecutor::new(config, Some("other.db".to_string()));
        assert_eq!(executor.config.watcher.db_path, "other.db");
    }

    #[tokio::test]
    async fn test_run_without_products_fails() {
        let config = ConfigLoader::from_toml("").unwrap();
        let executor = CommandExecutor::new(config, None);
        let result = executor.execute(Commands::Run { once: true, dry_run: true }).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_display_price() {
        assert_eq!(display_price(None), "n/a");
        assert_eq!(display_price(Some(Decimal::new(7900, 2))), "$79.00");
    }
}
