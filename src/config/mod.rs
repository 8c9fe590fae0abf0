use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::gateway::GateConfig;
use crate::upstream::coingecko::COINGECKO_API_BASE;
use crate::upstream::gemini::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE};
use crate::upstream::moralis::MORALIS_API_BASE;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Portfolio provider (optional; /wallet answers 500 without it)
    pub moralis_api_key: Option<String>,
    pub moralis_base_url: String,
    pub moralis_network: String,

    // Generative model (optional; /roast answers 500 without it)
    pub google_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,

    // Spot price
    pub coingecko_base_url: String,
    pub spot_price_refresh_secs: u64,

    // Admission gate
    pub gate_requests_per_minute: usize,
    pub gate_max_queue_size: usize,
    pub gate_max_retries: u32,
    pub gate_retry_delay_ms: u64,
    pub gate_queue_timeout_ms: u64,
    pub gate_sweep_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let gate = GateConfig::default();
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            moralis_api_key: None,
            moralis_base_url: MORALIS_API_BASE.into(),
            moralis_network: "mainnet".into(),
            google_api_key: None,
            gemini_base_url: GEMINI_API_BASE.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            coingecko_base_url: COINGECKO_API_BASE.into(),
            spot_price_refresh_secs: 30,
            gate_requests_per_minute: gate.requests_per_minute,
            gate_max_queue_size: gate.max_queue_size,
            gate_max_retries: gate.max_retries,
            gate_retry_delay_ms: gate.retry_delay.as_millis() as u64,
            gate_queue_timeout_ms: gate.queue_timeout.as_millis() as u64,
            gate_sweep_interval_ms: gate.sweep_interval.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let d = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(d.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            moralis_api_key: non_empty("MORALIS_API_KEY"),
            moralis_base_url: env::var("MORALIS_BASE_URL").unwrap_or(d.moralis_base_url),
            moralis_network: env::var("MORALIS_NETWORK").unwrap_or(d.moralis_network),

            google_api_key: non_empty("GOOGLE_API_KEY"),
            gemini_base_url: env::var("GEMINI_BASE_URL").unwrap_or(d.gemini_base_url),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(d.gemini_model),

            coingecko_base_url: env::var("COINGECKO_BASE_URL").unwrap_or(d.coingecko_base_url),
            spot_price_refresh_secs: parse_or("SPOT_PRICE_REFRESH_SECS", d.spot_price_refresh_secs),

            gate_requests_per_minute: parse_or("GATE_REQUESTS_PER_MINUTE", d.gate_requests_per_minute),
            gate_max_queue_size: parse_or("GATE_MAX_QUEUE_SIZE", d.gate_max_queue_size),
            gate_max_retries: parse_or("GATE_MAX_RETRIES", d.gate_max_retries),
            gate_retry_delay_ms: parse_or("GATE_RETRY_DELAY_MS", d.gate_retry_delay_ms),
            gate_queue_timeout_ms: parse_or("GATE_QUEUE_TIMEOUT_MS", d.gate_queue_timeout_ms),
            gate_sweep_interval_ms: parse_or("GATE_SWEEP_INTERVAL_MS", d.gate_sweep_interval_ms),
        })
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            requests_per_minute: self.gate_requests_per_minute.max(1),
            max_queue_size: self.gate_max_queue_size.max(1),
            max_retries: self.gate_max_retries,
            retry_delay: Duration::from_millis(self.gate_retry_delay_ms),
            queue_timeout: Duration::from_millis(self.gate_queue_timeout_ms),
            sweep_interval: Duration::from_millis(self.gate_sweep_interval_ms.max(1)),
        }
    }

    pub fn spot_price_interval(&self) -> Duration {
        Duration::from_secs(self.spot_price_refresh_secs.max(1))
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}
