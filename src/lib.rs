pub mod analytics;
pub mod api;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod services;
pub mod upstream;

use crate::config::AppConfig;
use crate::gateway::{AdmissionGate, PortfolioAggregator};
use crate::services::roaster::Roaster;
use crate::services::spot_price::SpotPriceTicker;
use crate::upstream::{CoinGeckoClient, GeminiClient, MoralisClient};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub aggregator: PortfolioAggregator,
    pub roaster: Roaster,
    pub spot_price: SpotPriceTicker,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    /// Wire clients and the admission gate from config. Background tasks
    /// (gate sweep, price ticker) are not started here.
    pub fn from_config(
        config: AppConfig,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let http = reqwest::Client::new();

        let moralis = config.moralis_api_key.clone().map(|key| {
            MoralisClient::new(http.clone(), key)
                .with_base_url(&config.moralis_base_url)
                .with_network(&config.moralis_network)
        });
        if moralis.is_none() {
            tracing::warn!("MORALIS_API_KEY not set, /wallet will answer 500");
        }

        let gemini = config.google_api_key.clone().map(|key| {
            GeminiClient::new(http.clone(), key)
                .with_base_url(&config.gemini_base_url)
                .with_model(&config.gemini_model)
        });
        if gemini.is_none() {
            tracing::warn!("GOOGLE_API_KEY not set, /roast will answer 500");
        }

        let coingecko = CoinGeckoClient::new(http).with_base_url(&config.coingecko_base_url);

        let gate = AdmissionGate::new(config.gate_config());
        let spot_price = SpotPriceTicker::new(coingecko, config.spot_price_interval());

        Self {
            aggregator: PortfolioAggregator::new(gate, moralis),
            roaster: Roaster::new(gemini),
            spot_price,
            metrics_handle,
            config,
        }
    }
}
