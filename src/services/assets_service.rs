use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;

use crate::{
    AppState,
    error::CommandError,
    models::{Asset, WatchConfig, asset::normalize_symbol},
    templates::{self, fmt2},
};

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]{0,31}$").expect("symbol pattern"));

/// Raw user input for a new asset; every field is text as typed.
#[derive(Debug, Default, Clone)]
pub struct NewAssetInput {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub amount: Option<String>,
    pub buy_price: Option<String>,
    pub sell_price: Option<String>,
    pub trend_threshold: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceLine {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioValue {
    pub currency: String,
    pub total: f64,
    pub priced: usize,
    pub skipped: Vec<String>,
    pub message: String,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Empty means "not set"; anything else must be a positive number.
fn parse_optional_number(raw: &Option<String>, label: &str) -> Result<Option<f64>, CommandError> {
    let Some(s) = non_empty(raw) else {
        return Ok(None);
    };

    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(Some(v)),
        _ => Err(CommandError::Validation(format!(
            "Please enter a valid {label} (a positive number)."
        ))),
    }
}

pub fn parse_symbol(raw: &Option<String>) -> Result<String, CommandError> {
    let sym = non_empty(raw).map(normalize_symbol).unwrap_or_default();
    if !SYMBOL_RE.is_match(&sym) {
        return Err(CommandError::Validation(
            "Please enter a valid cryptocurrency symbol (e.g., btc).".to_string(),
        ));
    }
    Ok(sym)
}

fn amount_text(a: &Asset) -> String {
    a.amount.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

/// Validates the input, resolves the display name when none was given,
/// appends the asset and restarts the monitor. Nothing is written on failure.
pub async fn add_asset(state: &AppState, input: NewAssetInput) -> Result<Asset, CommandError> {
    let symbol = parse_symbol(&input.symbol)?;
    let amount = parse_optional_number(&input.amount, "amount")?;
    let buy_price = parse_optional_number(&input.buy_price, "buy price")?;
    let sell_price = parse_optional_number(&input.sell_price, "sell price")?;
    let trend_threshold = parse_optional_number(&input.trend_threshold, "trend threshold")?;

    let name = match non_empty(&input.name) {
        Some(n) => n.to_string(),
        None => match state.prices.coin_name_by_symbol(&symbol).await {
            Ok(Some(n)) => n,
            Ok(None) => {
                return Err(CommandError::NotFound(format!(
                    "Could not find coin with symbol {symbol}"
                )));
            }
            Err(e) => {
                tracing::warn!("coin name lookup for {} failed: {}", symbol, e);
                return Err(CommandError::NotFound(format!(
                    "Could not find coin with symbol {symbol}"
                )));
            }
        },
    };

    let asset = Asset {
        amount,
        buy_price,
        sell_price,
        trend_threshold,
        ..Asset::new(&symbol, &name)
    };

    let added = asset.clone();
    state
        .store
        .update(move |config: &mut WatchConfig| {
            if config.find_asset(&asset.symbol).is_some() {
                return Err(CommandError::Conflict(format!(
                    "{} is already being monitored.",
                    asset.symbol.to_uppercase()
                )));
            }
            config.assets.push(asset);
            Ok(())
        })
        .await?;

    tracing::info!("added asset {}", added.label());
    state.monitor.apply_config_change().await?;

    Ok(added)
}

pub async fn remove_asset(state: &AppState, symbol: &str) -> Result<Asset, CommandError> {
    let sym = normalize_symbol(symbol);

    let removed = state
        .store
        .update(|config: &mut WatchConfig| {
            let Some(idx) = config.assets.iter().position(|a| a.symbol == sym) else {
                return Err(CommandError::NotFound(format!(
                    "Asset with symbol {symbol} not found."
                )));
            };
            Ok(config.assets.remove(idx))
        })
        .await?;

    tracing::info!("removed asset {}", removed.label());
    state.monitor.apply_config_change().await?;

    Ok(removed)
}

pub async fn list_assets(state: &AppState) -> Result<(String, Vec<Asset>), CommandError> {
    let config = state.store.read().await?;

    let items: Vec<serde_json::Value> = config
        .assets
        .iter()
        .map(|a| json!({ "label": a.label() }))
        .collect();
    let message = templates::render(&state.hbs, "reply/asset_list", &json!({ "assets": items }));

    Ok((message, config.assets))
}

pub async fn all_assets(state: &AppState) -> Result<(String, Vec<Asset>), CommandError> {
    let config = state.store.read().await?;

    let items: Vec<serde_json::Value> = config
        .assets
        .iter()
        .map(|a| json!({ "label": a.label(), "amount": amount_text(a) }))
        .collect();
    let message = templates::render(&state.hbs, "reply/asset_all", &json!({ "assets": items }));

    Ok((message, config.assets))
}

pub async fn get_asset(state: &AppState, symbol: &str) -> Result<(String, Asset), CommandError> {
    let config = state.store.read().await?;

    let Some(asset) = config.find_asset(symbol).cloned() else {
        return Err(CommandError::NotFound(format!(
            "Asset with symbol {} not found.",
            symbol.trim()
        )));
    };

    let message = templates::render(
        &state.hbs,
        "reply/asset_detail",
        &json!({ "label": asset.label(), "amount": amount_text(&asset) }),
    );

    Ok((message, asset))
}

/// Fetches every asset's price once and notifies it.
pub async fn check_prices(state: &AppState) -> Result<Vec<PriceLine>, CommandError> {
    let config = state.store.read().await?;
    let currency = config.currency_label();

    let mut lines = Vec::with_capacity(config.assets.len());
    for asset in &config.assets {
        let price = match state.prices.current_price(&asset.symbol, &config.currency).await {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("price check for {} failed: {}", asset.symbol, e);
                None
            }
        };

        let message = match price {
            Some(p) => templates::render(
                &state.hbs,
                "notify/current_price",
                &json!({ "currency": currency, "price": fmt2(p) }),
            ),
            None => templates::render(&state.hbs, "notify/price_unavailable", &json!({})),
        };

        state.notifier.notify(&asset.name, &message);

        lines.push(PriceLine {
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            price,
            message,
        });
    }

    Ok(lines)
}

/// Sum of amount × current price over assets with an amount.
pub async fn portfolio_value(state: &AppState) -> Result<PortfolioValue, CommandError> {
    let config = state.store.read().await?;

    let mut total = 0.0;
    let mut priced = 0;
    let mut skipped = Vec::new();

    for asset in &config.assets {
        let Some(amount) = asset.amount.filter(|a| *a > 0.0) else {
            continue;
        };

        match state.prices.current_price(&asset.symbol, &config.currency).await {
            Ok(p) => {
                total += amount * p;
                priced += 1;
            }
            Err(e) => {
                tracing::warn!("portfolio: no price for {}: {}", asset.symbol, e);
                skipped.push(asset.symbol.clone());
            }
        }
    }

    let currency = config.currency_label();
    let message = templates::render(
        &state.hbs,
        "reply/portfolio_value",
        &json!({ "currency": currency, "total": fmt2(total) }),
    );

    Ok(PortfolioValue {
        currency,
        total,
        priced,
        skipped,
        message,
    })
}
