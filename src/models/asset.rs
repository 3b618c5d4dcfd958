use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    // lowercase ticker, unique within the watch list
    pub symbol: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<f64>,

    // overrides the global threshold when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_threshold: Option<f64>,
}

impl Asset {
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            name: name.trim().to_string(),
            amount: None,
            buy_price: None,
            sell_price: None,
            trend_threshold: None,
        }
    }

    /// Threshold used by the trend check: the per-asset value when set, the global one otherwise.
    pub fn effective_threshold(&self, global: f64) -> f64 {
        match self.trend_threshold {
            Some(t) if t.is_finite() && t > 0.0 => t,
            _ => global,
        }
    }

    /// `Bitcoin (BTC)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.symbol.to_uppercase())
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}
