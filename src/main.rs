use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use trendnotifier::{AppState, config, routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();
    tracing::info!("watch configuration: {}", settings.watch_config_path().display());

    let state = AppState::from_settings(settings.clone());

    // resume monitoring when there is something to watch
    match state.store.read().await {
        Ok(cfg) if !cfg.assets.is_empty() => {
            if let Err(e) = state.monitor.start().await {
                tracing::error!("could not start monitor: {}", e);
            }
        }
        Ok(_) => tracing::info!("watch list is empty, monitor idle"),
        Err(e) => tracing::error!("could not load watch configuration: {}", e),
    }

    let app = routes::app(state);

    let ip = match settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("invalid HOST {:?}: {}", settings.host, e);
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("bind {} failed: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}
