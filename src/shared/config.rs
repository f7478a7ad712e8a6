use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::shared::errors::ConfigError;
use crate::shared::types::ProductWatch;

pub const DEFAULT_CONFIG_PATH: &str = "Config.toml";
pub const DEFAULT_ROLLING_WINDOW: usize = 30;
/// One year
pub const MAX_CHECK_INTERVAL_HOURS: u64 = 24 * 365;

/// Full watcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    #[serde(default)]
    pub watcher: WatcherSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub products: Vec<ProductWatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    pub db_path: String,
    pub check_interval_hours: u64,
    /// Pause between two products of the same cycle
    pub product_delay_secs: u64,
    pub rolling_window: usize,
    pub log_file: Option<String>,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            db_path: "prices.db".to_string(),
            check_interval_hours: 6,
            product_delay_secs: 3,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender: String::new(),
            password: String::new(),
            recipient: String::new(),
        }
    }
}

/// Загрузчик конфигурации
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<WatcherConfig, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<WatcherConfig, ConfigError> {
        let config: WatcherConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl WatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watcher.rolling_window == 0 {
            return Err(ConfigError::Invalid("watcher.rolling_window must be at least 1".into()));
        }
        let hours = self.watcher.check_interval_hours;
        if hours == 0 || hours > MAX_CHECK_INTERVAL_HOURS {
            return Err(ConfigError::Invalid(format!(
                "watcher.check_interval_hours must be between 1 and {}, got {}",
                MAX_CHECK_INTERVAL_HOURS, hours
            )));
        }
        if self.watcher.db_path.trim().is_empty() {
            return Err(ConfigError::Invalid("watcher.db_path must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::Invalid("product name must not be empty".into()));
            }
            if !seen.insert(product.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate product name: {}", product.name)));
            }
            if product.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("product {} has no url", product.name)));
            }
            if let Some(target) = product.target_price {
                if target <= Decimal::ZERO {
                    return Err(ConfigError::Invalid(format!(
                        "product {}: target_price must be positive, got {}",
                        product.name, target
                    )));
                }
            }
            if let Some(pct) = product.min_discount_pct {
                if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                    return Err(ConfigError::Invalid(format!(
                        "product {}: min_discount_pct must be in (0, 100], got {}",
                        product.name, pct
                    )));
                }
            }
        }

        if self.email.enabled {
            let email = &self.email;
            if email.smtp_host.is_empty() || email.sender.is_empty() || email.recipient.is_empty() {
                return Err(ConfigError::Invalid(
                    "email.smtp_host, email.sender and email.recipient are required when email is enabled".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [watcher]
        db_path = "test.db"
        rolling_window = 10

        [[products]]
        name = "Dell Inspiron 15 Laptop"
        url = "https://www.amazon.com/dp/XXXXXXXXXX"
        target_price = 699.00
        min_discount_pct = 10

        [[products]]
        name = "Kingston 1TB SSD"
        url = "https://www.amazon.com/dp/YYYYYYYYYY"
        target_price = "79.00"
    "#;

    #[test]
    fn test_parse_sample_config() {
        let cfg = ConfigLoader::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.watcher.db_path, "test.db");
        assert_eq!(cfg.watcher.rolling_window, 10);
        assert_eq!(cfg.watcher.check_interval_hours, 6);
        assert_eq!(cfg.products.len(), 2);
        assert_eq!(cfg.products[0].target_price, Some(Decimal::new(699, 0)));
        assert_eq!(cfg.products[0].min_discount_pct, Some(Decimal::new(10, 0)));
        assert_eq!(cfg.products[1].target_price, Some(Decimal::new(7900, 2)));
        assert_eq!(cfg.products[1].min_discount_pct, None);
        assert!(!cfg.email.enabled);
    }

    #[test]
    fn test_defaults() {
        let cfg = ConfigLoader::from_toml("").unwrap();
        assert_eq!(cfg.watcher.rolling_window, DEFAULT_ROLLING_WINDOW);
        assert_eq!(cfg.watcher.product_delay_secs, 3);
        assert_eq!(cfg.http.timeout_secs, 15);
        assert_eq!(cfg.email.smtp_port, 587);
        assert!(cfg.products.is_empty());
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = ConfigLoader::from_toml("[watcher]\nrolling_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_check_interval_bounds() {
        let err = ConfigLoader::from_toml("[watcher]\ncheck_interval_hours = 0\n").unwrap_err();
        assert!(err.to_string().contains("check_interval_hours"));

        let err = ConfigLoader::from_toml("[watcher]\ncheck_interval_hours = 5124095576030432\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let cfg = ConfigLoader::from_toml("[watcher]\ncheck_interval_hours = 8760\n").unwrap();
        assert_eq!(cfg.watcher.check_interval_hours, MAX_CHECK_INTERVAL_HOURS);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let toml = r#"
            [[products]]
            name = "a"
            url = "https://example.com/1"
            [[products]]
            name = "a"
            url = "https://example.com/2"
        "#;
        let err = ConfigLoader::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_out_of_range_discount() {
        let toml = r#"
            [[products]]
            name = "a"
            url = "https://example.com/1"
            min_discount_pct = 150
        "#;
        assert!(ConfigLoader::from_toml(toml).is_err());
    }

    #[test]
    fn test_enabled_email_requires_addresses() {
        let toml = "[email]\nenabled = true\n";
        assert!(ConfigLoader::from_toml(toml).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load("/nonexistent/pricewatch/Config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
