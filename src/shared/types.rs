//! Common types used across the application

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One observed price, as stored in the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub product: String,
    pub price: Decimal,
    pub url: String,
    pub observed_at: DateTime<Utc>,
}

impl PriceRecord {
    pub fn new(product: &str, price: Decimal, url: &str) -> Self {
        Self {
            product: product.to_string(),
            price,
            url: url.to_string(),
            observed_at: Utc::now(),
        }
    }
}

/// A product to watch and its alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWatch {
    pub name: String,
    pub url: String,
    /// Alert when the price drops to or below this value
    #[serde(default)]
    pub target_price: Option<Decimal>,
    /// Alert when the price is this many percent below the rolling average
    #[serde(default)]
    pub min_discount_pct: Option<Decimal>,
}

impl ProductWatch {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            target_price: None,
            min_discount_pct: None,
        }
    }

    pub fn with_target_price(mut self, target_price: Decimal) -> Self {
        self.target_price = Some(target_price);
        self
    }

    pub fn with_min_discount(mut self, min_discount_pct: Decimal) -> Self {
        self.min_discount_pct = Some(min_discount_pct);
        self
    }

    /// Whether any alert could ever fire for this product
    pub fn has_criteria(&self) -> bool {
        self.target_price.is_some()
            || self.min_discount_pct.map_or(false, |pct| pct > Decimal::ZERO)
    }
}

/// Deal found for one product in one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealResult {
    pub name: String,
    pub url: String,
    pub current_price: Decimal,
    pub alerts: Vec<String>,
}
