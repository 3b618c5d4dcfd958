use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tempfile::{TempDir, tempdir};
use tokio::sync::broadcast;
use tower::ServiceExt;
use trendnotifier::{
    AppState, config,
    models::{Asset, WatchConfig},
    routes,
    stubs::{RecordingNotifier, StubPriceSource},
};

struct TestApp {
    state: AppState,
    notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

fn test_settings(dir: &TempDir) -> config::Settings {
    config::Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        workspace_dir: dir.path().to_path_buf(),
        watch_config_file: config::DEFAULT_WATCH_CONFIG_FILE.to_string(),
        coingecko_api_url: "http://127.0.0.1:9".to_string(),
        http_timeout_secs: 1,
    }
}

fn test_app(prices: StubPriceSource) -> TestApp {
    let dir = tempdir().expect("tempdir");
    let notifier = Arc::new(RecordingNotifier::new());
    let (events_tx, _events_rx) = broadcast::channel::<String>(16);

    let state = AppState::assemble(test_settings(&dir), Arc::new(prices), notifier.clone(), events_tx);

    TestApp {
        state,
        notifier,
        _dir: dir,
    }
}

fn default_prices() -> StubPriceSource {
    StubPriceSource::new()
        .with_name("btc", "Bitcoin")
        .with_name("eth", "Ethereum")
        .with_quote("btc", 20000.0, 0.5)
        .with_quote("eth", 1500.0, -1.0)
}

async fn seed(app: &TestApp, assets: Vec<Asset>) {
    let config = WatchConfig {
        assets,
        ..WatchConfig::default()
    };
    app.state.store.write(&config).await.unwrap();
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = routes::app(app.state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn add_asset_resolves_name_and_restarts_monitor() {
    let app = test_app(default_prices());

    let (status, body) = send(&app, post_form("/assets", "symbol=BTC&amount=0.5&buyPrice=20000")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["asset"]["symbol"], "btc");
    assert_eq!(body["asset"]["name"], "Bitcoin");
    assert_eq!(body["asset"]["buyPrice"], 20000.0);

    let stored = app.state.store.read().await.unwrap();
    assert_eq!(stored.assets.len(), 1);
    assert_eq!(stored.assets[0].amount, Some(0.5));

    assert!(app.state.monitor.status().await.is_running());
    app.state.monitor.stop().await;
}

#[tokio::test]
async fn add_asset_keeps_typed_name() {
    let app = test_app(default_prices());

    let (status, body) = send(&app, post_form("/assets", "symbol=xyz&name=%20My%20Coin%20")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["asset"]["name"], "My Coin");
    app.state.monitor.stop().await;
}

#[tokio::test]
async fn add_unknown_symbol_is_rejected_without_writing() {
    let app = test_app(default_prices());

    let (status, body) = send(&app, post_form("/assets", "symbol=doge")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Could not find coin with symbol doge");

    assert!(app.state.store.read().await.unwrap().assets.is_empty());
    assert!(!app.state.monitor.status().await.is_running());
}

#[tokio::test]
async fn add_duplicate_symbol_conflicts() {
    let app = test_app(default_prices());
    seed(&app, vec![Asset::new("btc", "Bitcoin")]).await;

    let (status, _) = send(&app, post_form("/assets", "symbol=Btc")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.state.store.read().await.unwrap().assets.len(), 1);
}

#[tokio::test]
async fn add_with_invalid_number_is_a_validation_error() {
    let app = test_app(default_prices());

    let (status, body) = send(&app, post_form("/assets", "symbol=btc&sellPrice=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sell price"));

    let (status, _) = send(&app, post_form("/assets", "name=Bitcoin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn remove_asset_drops_it_from_the_list() {
    let app = test_app(default_prices());
    seed(&app, vec![Asset::new("btc", "Bitcoin"), Asset::new("eth", "Ethereum")]).await;

    let (status, body) = send(&app, post("/assets/by-symbol/BTC/delete")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bitcoin (BTC) removed from the watch list.");

    let stored = app.state.store.read().await.unwrap();
    assert_eq!(stored.assets, vec![Asset::new("eth", "Ethereum")]);
    app.state.monitor.stop().await;

    let (status, _) = send(&app, post("/assets/by-symbol/btc/delete")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_and_all_assets_render_messages() {
    let app = test_app(default_prices());
    seed(
        &app,
        vec![
            Asset {
                amount: Some(0.5),
                ..Asset::new("btc", "Bitcoin")
            },
            Asset::new("eth", "Ethereum"),
        ],
    )
    .await;

    let (_, body) = send(&app, get("/assets")).await;
    assert_eq!(body["message"], "Currently monitored assets: Bitcoin (BTC), Ethereum (ETH)");
    assert_eq!(body["assets"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/assets/all")).await;
    assert_eq!(body["message"], "All assets: Bitcoin (BTC): 0.5, Ethereum (ETH): n/a");
}

#[tokio::test]
async fn get_single_asset() {
    let app = test_app(default_prices());
    seed(
        &app,
        vec![Asset {
            amount: Some(2.0),
            ..Asset::new("eth", "Ethereum")
        }],
    )
    .await;

    let (status, body) = send(&app, get("/assets/by-symbol/ETH")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset: Ethereum (ETH) - Amount: 2");

    let (status, body) = send(&app, get("/assets/by-symbol/ada")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Asset with symbol ada not found.");
}

#[tokio::test]
async fn asset_named_like_a_route_is_still_reachable() {
    let app = test_app(default_prices());
    seed(
        &app,
        vec![Asset {
            amount: Some(3.0),
            ..Asset::new("all", "Alliance")
        }],
    )
    .await;

    let (status, body) = send(&app, get("/assets/by-symbol/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset: Alliance (ALL) - Amount: 3");

    let (status, body) = send(&app, get("/assets/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All assets: Alliance (ALL): 3");

    let (status, _) = send(&app, post("/assets/by-symbol/all/delete")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.state.store.read().await.unwrap().assets.is_empty());
    app.state.monitor.stop().await;
}

#[tokio::test]
async fn check_prices_notifies_each_asset() {
    let app = test_app(default_prices());
    seed(&app, vec![Asset::new("btc", "Bitcoin"), Asset::new("sol", "Solana")]).await;

    let (status, body) = send(&app, post("/prices/check")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prices"][0]["price"], 20000.0);
    assert!(body["prices"][1]["price"].is_null());

    assert_eq!(
        app.notifier.texts(),
        vec![
            "Bitcoin: current price is USD 20000.00".to_string(),
            "Solana: price is currently unavailable".to_string(),
        ]
    );
}

#[tokio::test]
async fn portfolio_value_sums_held_amounts() {
    let app = test_app(default_prices());
    seed(
        &app,
        vec![
            Asset {
                amount: Some(0.5),
                ..Asset::new("btc", "Bitcoin")
            },
            Asset {
                amount: Some(2.0),
                ..Asset::new("eth", "Ethereum")
            },
            // no amount: ignored
            Asset::new("ada", "Cardano"),
            // no price: skipped
            Asset {
                amount: Some(10.0),
                ..Asset::new("sol", "Solana")
            },
        ],
    )
    .await;

    let (status, body) = send(&app, get("/portfolio/value")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 13000.0);
    assert_eq!(body["priced"], 2);
    assert_eq!(body["skipped"], serde_json::json!(["sol"]));
    assert_eq!(body["message"], "Current portfolio value: USD 13000.00");
}

#[tokio::test]
async fn malformed_config_aborts_commands() {
    let app = test_app(default_prices());
    std::fs::write(app.state.store.path(), "{ broken").unwrap();

    let (status, body) = send(&app, get("/assets")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to access configuration file")
    );
}

#[tokio::test]
async fn open_config_creates_and_returns_document() {
    let app = test_app(default_prices());

    let (status, body) = send(&app, get("/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["path"].as_str().unwrap().ends_with(".cryptoTrendNotifier.json"));
    assert_eq!(body["document"]["currency"], "usd");
    assert_eq!(body["document"]["interval"], 60.0);
    assert!(app.state.store.path().exists());
}
