use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Asset, asset::normalize_symbol};

pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_THRESHOLD: f64 = 3.0;
pub const DEFAULT_INTERVAL_SECS: f64 = 60.0;
// one week
pub const MAX_INTERVAL_SECS: f64 = 7.0 * 24.0 * 3600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub assets: Vec<Asset>,
    pub currency: String,
    // percent
    pub threshold: f64,
    // seconds
    pub interval: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            threshold: DEFAULT_THRESHOLD,
            interval: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl WatchConfig {
    /// Checks the document invariants. Returns a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(format!("threshold must be a positive number, got {}", self.threshold));
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(format!("interval must be a positive number of seconds, got {}", self.interval));
        }
        if self.interval > MAX_INTERVAL_SECS {
            return Err(format!(
                "interval must be at most {MAX_INTERVAL_SECS} seconds, got {}",
                self.interval
            ));
        }
        if self.currency.trim().is_empty() {
            return Err("currency must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for a in &self.assets {
            let sym = normalize_symbol(&a.symbol);
            if !seen.insert(sym.clone()) {
                return Err(format!("asset {sym} is listed more than once"));
            }
        }
        Ok(())
    }

    /// Lowercases asset symbols and the currency code in place.
    pub fn normalize(&mut self) {
        self.currency = self.currency.trim().to_lowercase();
        for a in &mut self.assets {
            a.symbol = normalize_symbol(&a.symbol);
        }
    }

    pub fn find_asset(&self, symbol: &str) -> Option<&Asset> {
        let sym = normalize_symbol(symbol);
        self.assets.iter().find(|a| a.symbol == sym)
    }

    pub fn currency_label(&self) -> String {
        self.currency.to_uppercase()
    }
}
