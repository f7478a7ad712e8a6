use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use super::{extract_price, PriceFetcher};
use crate::shared::config::HttpSettings;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Scrapes product pages over HTTP
pub struct HttpPriceFetcher {
    http_client: Client,
}

impl HttpPriceFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent).context("invalid http.user_agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language).context("invalid http.accept_language")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("build HTTP client")?;

        Ok(Self { http_client })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.http_client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

#[async_trait]
impl PriceFetcher for HttpPriceFetcher {
    async fn fetch(&self, url: &str) -> Option<Decimal> {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                error!("Error accessing {}: {}", url, e);
                return None;
            }
        };
        debug!("Fetched {} bytes from {}", html.len(), url);

        let price = extract_price(&html);
        if price.is_none() {
            warn!("Price not found on page: {}", url);
        }
        price
    }
}
