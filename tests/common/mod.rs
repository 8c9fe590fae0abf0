use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use roastbot::api::router::create_router;
use roastbot::config::AppConfig;
use roastbot::AppState;

pub const TEST_WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const TEST_API_KEY: &str = "test-moralis-key";
pub const TEST_GOOGLE_KEY: &str = "test-google-key";
pub const SOL_PRICE: f64 = 150.0;

/// Knobs for the fake provider. Everything succeeds by default.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeBehavior {
    pub failing_price_mints: HashSet<String>,
    /// Mints answered with 200 and a `usdPrice` that is not a number.
    pub garbage_price_mints: HashSet<String>,
    pub fail_portfolio: bool,
    pub fail_swaps: bool,
    pub fail_spot_price: bool,
    pub fail_model: bool,
    pub price_delay: Duration,
}

#[derive(Default)]
#[allow(dead_code)]
pub struct FakeCounters {
    pub portfolio_calls: AtomicUsize,
    pub price_calls: AtomicUsize,
    pub swap_calls: AtomicUsize,
    pub model_calls: AtomicUsize,
}

struct FakeState {
    behavior: FakeBehavior,
    counters: Arc<FakeCounters>,
}

#[allow(dead_code)]
pub struct FakeUpstream {
    pub base_url: String,
    pub counters: Arc<FakeCounters>,
}

/// Serve a fake Moralis + CoinGecko + Gemini on an ephemeral local port.
pub async fn spawn_fake_upstream(behavior: FakeBehavior) -> FakeUpstream {
    let counters = Arc::new(FakeCounters::default());
    let state = Arc::new(FakeState {
        behavior,
        counters: counters.clone(),
    });

    let app = Router::new()
        .route("/account/:net/:address/portfolio", get(fake_portfolio))
        .route("/account/:net/:address/swaps", get(fake_swaps))
        .route("/token/:net/:mint/price", get(fake_price))
        .route("/api/v3/simple/price", get(fake_spot_price))
        .route("/v1beta/models/:model", post(fake_generate))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake upstream");
    let addr = listener.local_addr().expect("Fake upstream has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake upstream crashed");
    });

    FakeUpstream {
        base_url: format!("http://{addr}"),
        counters,
    }
}

fn has_key(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(TEST_API_KEY)
}

pub fn portfolio_fixture() -> Value {
    let token = |mint: &str, amount: &str| {
        json!({
            "associatedTokenAddress": format!("ata-{mint}"),
            "mint": mint,
            "name": format!("{mint} Token"),
            "symbol": mint,
            "amount": amount,
            "amountRaw": format!("{amount}000000"),
            "decimals": "6",
            "logo": format!("https://img.invalid/{mint}.png")
        })
    };

    json!({
        "nativeBalance": { "solana": "1", "lamports": "1000000000" },
        "tokens": [
            token("FOO", "100"),
            token("BAR", "10"),
            token("BAZ", "20"),
            token("QUX", "30"),
            token("ZAP", "40")
        ],
        "nfts": [
            { "associatedTokenAddress": "ata-nft", "mint": "NFT1", "name": "Sad Ape #1", "symbol": "SAPE" }
        ]
    })
}

pub fn swaps_fixture() -> Value {
    json!({
        "cursor": null,
        "page": 1,
        "pageSize": 100,
        "result": [
            {
                "transactionHash": "sell-foo",
                "transactionType": "sell",
                "blockTimestamp": "2025-02-01T00:00:00.000Z",
                "pairLabel": "FOO/SOL",
                "exchangeName": "Raydium",
                "bought": { "address": "SOL", "amount": "0.2", "usdAmount": 30.0, "symbol": "SOL", "name": "Solana" },
                "sold": { "address": "FOO", "amount": "40", "usdAmount": 30.0, "symbol": "FOO", "name": "FOO Token" },
                "totalValueUsd": 30.0
            },
            {
                "transactionHash": "buy-foo",
                "transactionType": "buy",
                "blockTimestamp": "2025-01-01T00:00:00.000Z",
                "pairLabel": "FOO/SOL",
                "exchangeName": "Raydium",
                "bought": { "address": "FOO", "amount": "100", "usdAmount": 50.0, "symbol": "FOO", "name": "FOO Token" },
                "sold": { "address": "SOL", "amount": "0.3", "usdAmount": 50.0, "symbol": "SOL", "name": "Solana" },
                "totalValueUsd": 50.0
            }
        ]
    })
}

fn upstream_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))).into_response()
}

async fn fake_portfolio(
    State(state): State<Arc<FakeState>>,
    Path((_net, _address)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.counters.portfolio_calls.fetch_add(1, Ordering::SeqCst);
    if !has_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.behavior.fail_portfolio {
        return upstream_error();
    }
    Json(portfolio_fixture()).into_response()
}

async fn fake_swaps(
    State(state): State<Arc<FakeState>>,
    Path((_net, _address)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.counters.swap_calls.fetch_add(1, Ordering::SeqCst);
    if !has_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.behavior.fail_swaps {
        return upstream_error();
    }
    Json(swaps_fixture()).into_response()
}

async fn fake_price(
    State(state): State<Arc<FakeState>>,
    Path((_net, mint)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.counters.price_calls.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.price_delay.is_zero() {
        tokio::time::sleep(state.behavior.price_delay).await;
    }
    if !has_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.behavior.failing_price_mints.contains(&mint) {
        return upstream_error();
    }
    let usd = if state.behavior.garbage_price_mints.contains(&mint) {
        "n/a"
    } else if mint == "FOO" {
        "1.0"
    } else {
        "0.5"
    };
    Json(json!({
        "nativePrice": { "value": "1", "decimals": "9", "name": "Wrapped Solana", "symbol": "WSOL" },
        "usdPrice": usd,
        "exchangeAddress": "dex",
        "exchangeName": "Raydium"
    }))
    .into_response()
}

async fn fake_spot_price(State(state): State<Arc<FakeState>>) -> Response {
    if state.behavior.fail_spot_price {
        return upstream_error();
    }
    Json(json!({ "solana": { "usd": SOL_PRICE } })).into_response()
}

async fn fake_generate(
    State(state): State<Arc<FakeState>>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.counters.model_calls.fetch_add(1, Ordering::SeqCst);
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_GOOGLE_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if state.behavior.fail_model || !model.ends_with(":generateContent") {
        return upstream_error();
    }
    let has_system = body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .is_some_and(|s| s.contains("Digital Dumpster Diver"));
    let user_text = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    if !has_system || user_text.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing prompt").into_response();
    }

    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": format!("Right, let's sift through this digital manure.\n\nYou sent {} bytes of regret.", user_text.len()) }]
            }
        }]
    }))
    .into_response()
}

/// Config pointing every provider at `upstream`, with a fast admission gate.
#[allow(dead_code)]
pub fn test_config(upstream: &FakeUpstream) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        moralis_api_key: Some(TEST_API_KEY.into()),
        moralis_base_url: upstream.base_url.clone(),
        moralis_network: "mainnet".into(),
        google_api_key: Some(TEST_GOOGLE_KEY.into()),
        gemini_base_url: upstream.base_url.clone(),
        gemini_model: "gemini-2.0-flash".into(),
        coingecko_base_url: upstream.base_url.clone(),
        spot_price_refresh_secs: 30,
        gate_requests_per_minute: 4,
        gate_max_queue_size: 16,
        gate_max_retries: 3,
        gate_retry_delay_ms: 10,
        gate_queue_timeout_ms: 30_000,
        gate_sweep_interval_ms: 5_000,
    }
}

#[allow(dead_code)]
pub fn build_test_app(config: AppConfig) -> (Router, AppState) {
    let metrics_handle = roastbot::metrics::init_metrics();
    let state = AppState::from_config(config, metrics_handle);
    (create_router(state.clone()), state)
}

/// Send one request and return status plus parsed JSON body (Null if not JSON).
#[allow(dead_code)]
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
