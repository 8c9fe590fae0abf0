use reqwest::Client;
use thiserror::Error;

use super::types::ApiSimplePrice;

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com";

#[derive(Debug, Error)]
pub enum CoinGeckoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: COINGECKO_API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// SOL/USD spot price.
    pub async fn get_solana_price(&self) -> Result<f64, CoinGeckoError> {
        let url = format!(
            "{}/api/v3/simple/price?ids=solana&vs_currencies=usd",
            self.base_url
        );
        let resp = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body: ApiSimplePrice = resp.json().await?;
        Ok(body.solana.usd)
    }
}
