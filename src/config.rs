use std::{env, path::PathBuf};

pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_WATCH_CONFIG_FILE: &str = ".cryptoTrendNotifier.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub workspace_dir: PathBuf,
    pub watch_config_file: String,

    pub coingecko_api_url: String,
    pub http_timeout_secs: u64,
}

impl Settings {
    /// Location of the watch configuration document.
    pub fn watch_config_path(&self) -> PathBuf {
        self.workspace_dir.join(&self.watch_config_file)
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let workspace_dir = env::var("WORKSPACE_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let watch_config_file = env::var("WATCH_CONFIG_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_WATCH_CONFIG_FILE.to_string());

    let coingecko_api_url = env::var("COINGECKO_API_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COINGECKO_API_URL.to_string());

    let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(10);

    Settings {
        host,
        port,
        workspace_dir,
        watch_config_file,
        coingecko_api_url,
        http_timeout_secs,
    }
}
