use std::time::Instant;

use futures_util::future::join_all;
use metrics::{counter, histogram};
use thiserror::Error;

use super::admission::{AdmissionError, AdmissionGate};
use crate::models::{PortfolioResult, TokenHolding, WalletAddress};
use crate::upstream::{MoralisClient, MoralisError};

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("rate limited: {0}")]
    RateLimited(#[from] AdmissionError),

    #[error("portfolio provider API key is not configured")]
    NotConfigured,

    #[error("{stage} fetch failed: {source}")]
    Upstream {
        stage: &'static str,
        #[source]
        source: MoralisError,
    },
}

/// Composes portfolio, per-token price and swap history into one wallet view,
/// behind the shared admission gate.
#[derive(Clone)]
pub struct PortfolioAggregator {
    gate: AdmissionGate,
    moralis: Option<MoralisClient>,
}

impl PortfolioAggregator {
    pub fn new(gate: AdmissionGate, moralis: Option<MoralisClient>) -> Self {
        Self { gate, moralis }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub async fn fetch_portfolio(&self, address: &WalletAddress) -> Result<PortfolioResult, AggregatorError> {
        let client = self.moralis.as_ref().ok_or(AggregatorError::NotConfigured)?;
        counter!("wallet_requests_total").increment(1);

        let request_id = self.gate.submit(address).await?;
        let slot = self.gate.guard(request_id.clone());
        if let Err(e) = self.gate.admit(&request_id).await {
            slot.release().await;
            return Err(e.into());
        }

        let started = Instant::now();
        let result = fetch_admitted(client, address).await;
        slot.release().await;
        histogram!("wallet_fetch_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(portfolio) => tracing::info!(
                address = %address.short(),
                tokens = portfolio.tokens.len(),
                swaps = portfolio.swaps.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Wallet portfolio fetched"
            ),
            Err(e) => tracing::error!(address = %address.short(), error = %e, "Wallet portfolio fetch failed"),
        }
        result
    }
}

async fn fetch_admitted(client: &MoralisClient, address: &WalletAddress) -> Result<PortfolioResult, AggregatorError> {
    let mut snapshot = client
        .get_portfolio(address.as_str())
        .await
        .map_err(|source| AggregatorError::Upstream { stage: "portfolio", source })?;

    let tokens = enrich_prices(client, std::mem::take(&mut snapshot.tokens)).await;

    let swaps = client
        .get_swaps(address.as_str())
        .await
        .map_err(|source| AggregatorError::Upstream { stage: "swap history", source })?;

    Ok(PortfolioResult::merge(snapshot, tokens, swaps))
}

/// Best-effort price lookup for every token at once. A failed lookup leaves
/// that token's price as `None`; results are matched back by position.
async fn enrich_prices(client: &MoralisClient, tokens: Vec<TokenHolding>) -> Vec<TokenHolding> {
    let prices = join_all(tokens.iter().map(|token| client.get_token_price(&token.mint))).await;

    tokens
        .into_iter()
        .zip(prices)
        .map(|(mut token, price)| {
            token.current_price = match price {
                Ok(usd) => Some(usd),
                Err(e) => {
                    counter!("price_lookup_failures_total").increment(1);
                    tracing::warn!(mint = %token.mint, error = %e, "Token price lookup failed");
                    None
                }
            };
            token
        })
        .collect()
}
