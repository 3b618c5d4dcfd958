//! Library entrypoint for TrendNotifier.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast;

pub mod config;
pub mod error;
pub mod models;
#[cfg(any(test, feature = "test-util"))]
pub mod stubs;
pub mod templates;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    alert_monitor::Monitor,
    coingecko::{CoinGeckoClient, PriceSource},
    config_store::ConfigStore,
    notifier::{BroadcastNotifier, Notifier},
};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub prices: Arc<dyn PriceSource>,
    pub notifier: Arc<dyn Notifier>,
    pub store: ConfigStore,
    pub monitor: Monitor,
    pub events_tx: broadcast::Sender<String>,
}

impl AppState {
    /// Production wiring: CoinGecko prices, notifications on the `/events` stream.
    pub fn from_settings(settings: config::Settings) -> Self {
        let prices = CoinGeckoClient::new(
            &settings.coingecko_api_url,
            Duration::from_secs(settings.http_timeout_secs),
        );
        let (events_tx, _events_rx) = broadcast::channel::<String>(64);
        let notifier = BroadcastNotifier::new(events_tx.clone());

        Self::assemble(settings, Arc::new(prices), Arc::new(notifier), events_tx)
    }

    pub fn assemble(
        settings: config::Settings,
        prices: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        events_tx: broadcast::Sender<String>,
    ) -> Self {
        let hbs = templates::build_handlebars();
        let store = ConfigStore::new(settings.watch_config_path());
        let monitor = Monitor::new(prices.clone(), notifier.clone(), hbs.clone(), store.clone());

        Self {
            hbs,
            settings,
            prices,
            notifier,
            store,
            monitor,
            events_tx,
        }
    }
}
