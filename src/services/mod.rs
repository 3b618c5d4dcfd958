pub mod coingecko;
pub mod notifier;
pub mod config_store;
pub mod alert_monitor;

pub mod assets_service;
