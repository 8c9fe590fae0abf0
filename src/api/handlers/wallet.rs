use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::analytics::{
    all_tokens_ever, build_wallet_report, SortDirection, TokenReport, TokenSort, TokenSortKey, WalletReport,
};
use crate::errors::AppError;
use crate::models::{PortfolioResult, WalletAddress};
use crate::AppState;

#[derive(Deserialize)]
pub struct WalletQuery {
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct TokensQuery {
    pub address: Option<String>,
    pub sort: Option<TokenSortKey>,
    pub direction: Option<SortDirection>,
}

fn wallet_address(query: Result<Query<WalletQuery>, QueryRejection>) -> Result<WalletAddress, AppError> {
    query
        .ok()
        .and_then(|Query(q)| q.address)
        .as_deref()
        .and_then(WalletAddress::parse)
        .ok_or_else(|| AppError::BadRequest("Wallet address is required".into()))
}

/// Merged portfolio, prices and swap history for one wallet.
pub async fn portfolio(
    State(state): State<AppState>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> Result<Json<PortfolioResult>, AppError> {
    let address = wallet_address(query)?;
    let portfolio = state.aggregator.fetch_portfolio(&address).await?;
    Ok(Json(portfolio))
}

/// Per-token PnL, total value and the roast-ready summary for one wallet.
pub async fn report(
    State(state): State<AppState>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> Result<Json<WalletReport>, AppError> {
    let address = wallet_address(query)?;
    let portfolio = state.aggregator.fetch_portfolio(&address).await?;
    let sol_price = state.spot_price.current().await;
    Ok(Json(build_wallet_report(&address, &portfolio, sol_price)))
}

/// Every token the wallet ever held or swapped, with PnL, sorted.
pub async fn tokens(
    State(state): State<AppState>,
    query: Result<Query<TokensQuery>, QueryRejection>,
) -> Result<Json<Vec<TokenReport>>, AppError> {
    let Query(q) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let address = q
        .address
        .as_deref()
        .and_then(WalletAddress::parse)
        .ok_or_else(|| AppError::BadRequest("Wallet address is required".into()))?;
    let sort = TokenSort {
        key: q.sort.unwrap_or_default(),
        direction: q.direction.unwrap_or_default(),
    };

    let portfolio = state.aggregator.fetch_portfolio(&address).await?;
    Ok(Json(all_tokens_ever(&portfolio, sort)))
}
