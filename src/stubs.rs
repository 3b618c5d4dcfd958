//! In-memory stand-ins for the remote price API and the user-facing sink,
//! for driving the monitor and the command routes without network access.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    error::PriceError,
    models::Notification,
    services::{
        coingecko::{MarketQuote, PriceSource},
        notifier::Notifier,
    },
};

/// Serves fixed quotes. A symbol without a quote behaves like a failed request.
#[derive(Default)]
pub struct StubPriceSource {
    quotes: Mutex<HashMap<String, MarketQuote>>,
    names: HashMap<String, String>,
    fetches: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl StubPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, symbol: &str, price: f64, change_1h: f64) -> Self {
        self.set_quote(symbol, price, change_1h);
        self
    }

    pub fn with_name(mut self, symbol: &str, name: &str) -> Self {
        self.names.insert(symbol.to_lowercase(), name.to_string());
        self
    }

    pub fn set_quote(&self, symbol: &str, price: f64, change_1h: f64) {
        if let Ok(mut q) = self.quotes.lock() {
            q.insert(symbol.to_lowercase(), MarketQuote { price, change_1h });
        }
    }

    /// Number of market requests served so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Symbols in the order they were requested.
    pub fn fetched_symbols(&self) -> Vec<String> {
        self.fetched.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PriceSource for StubPriceSource {
    async fn fetch_market(&self, symbol: &str, _currency: &str) -> Result<MarketQuote, PriceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut v) = self.fetched.lock() {
            v.push(symbol.to_string());
        }

        self.quotes
            .lock()
            .ok()
            .and_then(|q| q.get(&symbol.to_lowercase()).copied())
            .ok_or_else(|| PriceError::NoData(symbol.to_string()))
    }

    async fn coin_name_by_symbol(&self, symbol: &str) -> Result<Option<String>, PriceError> {
        Ok(self.names.get(&symbol.trim().to_lowercase()).cloned())
    }
}

/// Keeps notifications in memory instead of showing them.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().iter().map(Notification::text).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, subject: &str, message: &str) {
        tracing::debug!("recorded notification {}: {}", subject, message);
        if let Ok(mut v) = self.sent.lock() {
            v.push(Notification::new(subject, message));
        }
    }
}
