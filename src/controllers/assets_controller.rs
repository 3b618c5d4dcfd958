use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    services::assets_service::{self, NewAssetInput},
};

#[derive(Debug, Default, Deserialize)]
pub struct AddAssetForm {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default, rename = "buyPrice")]
    pub buy_price: Option<String>,
    #[serde(default, rename = "sellPrice")]
    pub sell_price: Option<String>,
    #[serde(default, rename = "trendThreshold")]
    pub trend_threshold: Option<String>,
}

impl From<AddAssetForm> for NewAssetInput {
    fn from(f: AddAssetForm) -> Self {
        Self {
            symbol: f.symbol,
            name: f.name,
            amount: f.amount,
            buy_price: f.buy_price,
            sell_price: f.sell_price,
            trend_threshold: f.trend_threshold,
        }
    }
}

// POST /assets
pub async fn post_add_asset(State(state): State<AppState>, Form(form): Form<AddAssetForm>) -> Response {
    match assets_service::add_asset(&state, form.into()).await {
        Ok(asset) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("{} added to the watch list.", asset.label()),
                "asset": asset,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /assets/by-symbol/:symbol/delete
pub async fn post_remove_asset(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    match assets_service::remove_asset(&state, &symbol).await {
        Ok(asset) => Json(json!({
            "message": format!("{} removed from the watch list.", asset.label()),
            "asset": asset,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /assets
pub async fn get_list_assets(State(state): State<AppState>) -> Response {
    match assets_service::list_assets(&state).await {
        Ok((message, assets)) => Json(json!({ "message": message, "assets": assets })).into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /assets/all
pub async fn get_all_assets(State(state): State<AppState>) -> Response {
    match assets_service::all_assets(&state).await {
        Ok((message, assets)) => Json(json!({ "message": message, "assets": assets })).into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /assets/by-symbol/:symbol
pub async fn get_asset(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    match assets_service::get_asset(&state, &symbol).await {
        Ok((message, asset)) => Json(json!({ "message": message, "asset": asset })).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /prices/check
pub async fn post_check_prices(State(state): State<AppState>) -> Response {
    match assets_service::check_prices(&state).await {
        Ok(lines) => Json(json!({
            "message": format!("Checked {} asset(s).", lines.len()),
            "prices": lines,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /portfolio/value
pub async fn get_portfolio_value(State(state): State<AppState>) -> Response {
    match assets_service::portfolio_value(&state).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => e.into_response(),
    }
}
