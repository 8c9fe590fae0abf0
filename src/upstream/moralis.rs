use reqwest::{Client, RequestBuilder};
use thiserror::Error;

use super::types::{ApiSwapPage, ApiTokenPrice};
use crate::models::{PortfolioSnapshot, SwapRecord};

pub const MORALIS_API_BASE: &str = "https://solana-gateway.moralis.io";

#[derive(Debug, Error)]
pub enum MoralisError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the Moralis Solana gateway: portfolio, token price and swaps.
#[derive(Debug, Clone)]
pub struct MoralisClient {
    http: Client,
    base_url: String,
    network: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            base_url: MORALIS_API_BASE.into(),
            network: "mainnet".into(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http
            .get(url)
            .header("accept", "application/json")
            .header("X-API-Key", &self.api_key)
    }

    /// Balances, token list and NFTs for a wallet.
    pub async fn get_portfolio(&self, address: &str) -> Result<PortfolioSnapshot, MoralisError> {
        let url = format!(
            "{}/account/{}/{}/portfolio?nftMetadata=true",
            self.base_url, self.network, address
        );
        let resp = self.get(&url).send().await?.error_for_status()?;

        let portfolio: PortfolioSnapshot = resp.json().await?;
        Ok(portfolio)
    }

    /// Current USD price of a token mint. Non-2xx and transport failures are
    /// errors; a successful body without a usable `usdPrice` is 0.
    pub async fn get_token_price(&self, mint: &str) -> Result<f64, MoralisError> {
        let url = format!("{}/token/{}/{}/price", self.base_url, self.network, mint);
        let resp = self.get(&url).send().await?.error_for_status()?;

        let price: ApiTokenPrice = resp.json().await?;
        let usd = price.usd();
        if usd == 0.0 {
            tracing::debug!(mint, raw = %price.usd_price, "Token price missing or unparseable, using 0");
        }
        Ok(usd)
    }

    /// Swap history for a wallet, newest first.
    pub async fn get_swaps(&self, address: &str) -> Result<Vec<SwapRecord>, MoralisError> {
        let url = format!(
            "{}/account/{}/{}/swaps?order=DESC",
            self.base_url, self.network, address
        );
        let resp = self.get(&url).send().await?.error_for_status()?;

        let page: ApiSwapPage = resp.json().await?;
        Ok(page.result)
    }
}
