use std::{sync::Arc, time::Duration};

use serde::Serialize;
use serde_json::json;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    error::StoreError,
    models::{Asset, WatchConfig},
    services::{
        coingecko::{MarketQuote, PriceSource},
        config_store::ConfigStore,
        notifier::Notifier,
    },
    templates::{self, Hbs, fmt2},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MonitorStatus {
    Idle,
    Running {
        // seconds
        interval: f64,
        assets: usize,
        currency: String,
        started_at: i64,
    },
}

impl MonitorStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, MonitorStatus::Running { .. })
    }
}

/// What one pass over the watch list did.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub notifications: usize,
}

struct Running {
    handle: JoinHandle<()>,
    status: MonitorStatus,
}

/// Owns the single repeating timer that drives the watch loop.
///
/// The configuration is captured when the timer is scheduled; later edits
/// only take effect through `start` or `apply_config_change`.
#[derive(Clone)]
pub struct Monitor {
    prices: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    hbs: Hbs,
    store: ConfigStore,
    running: Arc<Mutex<Option<Running>>>,
}

impl Monitor {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        hbs: Hbs,
        store: ConfigStore,
    ) -> Self {
        Self {
            prices,
            notifier,
            hbs,
            store,
            running: Arc::new(Mutex::new(None)),
        }
    }

    /// Loads the configuration once and (re)schedules the timer.
    ///
    /// The read and the reschedule happen under the same lock, so when two
    /// restarts race the one that read last is the one left running.
    pub async fn start(&self) -> Result<MonitorStatus, StoreError> {
        let mut slot = self.running.lock().await;
        let config = self.store.read().await?;
        self.replace_timer(&mut slot, config)
    }

    /// Called after the watch list was written so the running schedule picks it up.
    pub async fn apply_config_change(&self) -> Result<MonitorStatus, StoreError> {
        tracing::info!("watch list changed, restarting monitor");
        self.start().await
    }

    /// Replaces any active timer with one driven by `config`. A config that
    /// fails validation is refused and the current timer is left alone.
    pub async fn schedule(&self, config: WatchConfig) -> Result<MonitorStatus, StoreError> {
        let mut slot = self.running.lock().await;
        self.replace_timer(&mut slot, config)
    }

    fn replace_timer(
        &self,
        slot: &mut Option<Running>,
        config: WatchConfig,
    ) -> Result<MonitorStatus, StoreError> {
        config.validate().map_err(StoreError::Invalid)?;

        let period = Duration::from_secs_f64(config.interval);
        // first tick one full interval after start
        let first = Instant::now().checked_add(period).ok_or_else(|| {
            StoreError::Invalid(format!("interval of {}s is too long", config.interval))
        })?;

        if let Some(prev) = slot.take() {
            prev.handle.abort();
            tracing::debug!("cancelled previous monitor timer");
        }

        let status = MonitorStatus::Running {
            interval: config.interval,
            assets: config.assets.len(),
            currency: config.currency.clone(),
            started_at: chrono::Utc::now().timestamp(),
        };

        tracing::info!(
            "monitoring {} asset(s) in {} every {}s",
            config.assets.len(),
            config.currency_label(),
            config.interval
        );

        let handle = spawn_timer(
            self.prices.clone(),
            self.notifier.clone(),
            self.hbs.clone(),
            first,
            period,
            config,
        );

        *slot = Some(Running {
            handle,
            status: status.clone(),
        });

        Ok(status)
    }

    /// Cancels the timer. Returns false when the monitor was already idle.
    pub async fn stop(&self) -> bool {
        let mut slot = self.running.lock().await;
        match slot.take() {
            Some(running) => {
                running.handle.abort();
                tracing::info!("monitoring stopped");
                true
            }
            None => false,
        }
    }

    pub async fn status(&self) -> MonitorStatus {
        let slot = self.running.lock().await;
        slot.as_ref()
            .map(|r| r.status.clone())
            .unwrap_or(MonitorStatus::Idle)
    }
}

fn spawn_timer(
    prices: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    hbs: Hbs,
    first: Instant,
    period: Duration,
    config: WatchConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(first, period);
        // a slow tick delays the next one instead of overlapping it
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let report = run_tick(prices.as_ref(), notifier.as_ref(), &hbs, &config).await;
            tracing::debug!(
                "tick done: evaluated={} skipped={} notifications={}",
                report.evaluated,
                report.skipped,
                report.notifications
            );
        }
    })
}

/// One pass over the watch list, in list order. A failed fetch skips that
/// asset for this tick only.
pub async fn run_tick(
    prices: &dyn PriceSource,
    notifier: &dyn Notifier,
    hbs: &Hbs,
    config: &WatchConfig,
) -> TickReport {
    let mut report = TickReport::default();

    for asset in &config.assets {
        let quote = match prices.fetch_market(&asset.symbol, &config.currency).await {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!("skipping {} this tick: {}", asset.symbol, e);
                report.skipped += 1;
                continue;
            }
        };

        report.evaluated += 1;

        for message in evaluate_asset(hbs, asset, &quote, config) {
            notifier.notify(&asset.name, &message);
            report.notifications += 1;
        }
    }

    report
}

/// Trend, buy and sell checks for one asset. Independent: zero to three messages.
pub fn evaluate_asset(
    hbs: &Hbs,
    asset: &Asset,
    quote: &MarketQuote,
    config: &WatchConfig,
) -> Vec<String> {
    let mut out = Vec::new();
    let currency = config.currency_label();

    if quote.change_1h.abs() >= asset.effective_threshold(config.threshold) {
        out.push(templates::render(
            hbs,
            "notify/trend",
            &json!({ "change": fmt2(quote.change_1h) }),
        ));
    }

    if let Some(buy) = asset.buy_price.filter(|p| *p > 0.0) {
        if quote.price <= buy {
            out.push(templates::render(
                hbs,
                "notify/buy",
                &json!({ "currency": currency, "price": buy.to_string() }),
            ));
        }
    }

    if let Some(sell) = asset.sell_price.filter(|p| *p > 0.0) {
        if quote.price >= sell {
            out.push(templates::render(
                hbs,
                "notify/sell",
                &json!({ "currency": currency, "price": sell.to_string() }),
            ));
        }
    }

    out
}
