use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::PriceError;

/// Spot price and 1h change for one symbol in one quote currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketQuote {
    pub price: f64,
    // percent
    pub change_1h: f64,
}

/// Where the monitor and the asset commands get prices from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// One request returning both the price and the hourly change.
    async fn fetch_market(&self, symbol: &str, currency: &str) -> Result<MarketQuote, PriceError>;

    /// Full coin name for a ticker symbol, `None` when the catalog has no match.
    async fn coin_name_by_symbol(&self, symbol: &str) -> Result<Option<String>, PriceError>;

    async fn current_price(&self, symbol: &str, currency: &str) -> Result<f64, PriceError> {
        self.fetch_market(symbol, currency).await.map(|q| q.price)
    }

    async fn price_change(&self, symbol: &str, currency: &str) -> Result<f64, PriceError> {
        self.fetch_market(symbol, currency).await.map(|q| q.change_1h)
    }
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trend-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn markets(&self, symbol: &str, currency: &str) -> Result<Vec<MarketItem>, PriceError> {
        let url = format!("{}/coins/markets", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[
                ("vs_currency", currency),
                ("ids", symbol),
                ("price_change_percentage", "1h"),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(PriceError::Status { status, body });
        }

        Ok(res.json::<Vec<MarketItem>>().await?)
    }

    pub async fn coins_list(&self) -> Result<Vec<CoinListItem>, PriceError> {
        let url = format!("{}/coins/list", self.base_url);
        let res = self.http.get(url).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(PriceError::Status { status, body });
        }

        Ok(res.json::<Vec<CoinListItem>>().await?)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_market(&self, symbol: &str, currency: &str) -> Result<MarketQuote, PriceError> {
        let items = self.markets(symbol, currency).await?;

        let Some(first) = items.into_iter().next() else {
            return Err(PriceError::NoData(symbol.to_string()));
        };

        match (first.current_price, first.price_change_percentage_1h_in_currency) {
            (Some(price), Some(change_1h)) if price.is_finite() && change_1h.is_finite() => {
                Ok(MarketQuote { price, change_1h })
            }
            _ => Err(PriceError::NoData(symbol.to_string())),
        }
    }

    async fn coin_name_by_symbol(&self, symbol: &str) -> Result<Option<String>, PriceError> {
        let coins = self.coins_list().await?;
        Ok(find_coin_name(&coins, symbol))
    }
}

pub fn find_coin_name(coins: &[CoinListItem], symbol: &str) -> Option<String> {
    let sym = symbol.trim();
    coins
        .iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(sym))
        .map(|c| c.name.clone())
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarketItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub symbol: String,

    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoinListItem {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    pub name: String,
}
