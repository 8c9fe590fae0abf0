use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::AppState;

#[derive(Serialize)]
pub struct PriceResponse {
    pub price: f64,
}

/// Live SOL/USD price. Also refreshes the cached quote used by reports.
pub async fn solana_price(State(state): State<AppState>) -> Result<Json<PriceResponse>, AppError> {
    let price = state.spot_price.refresh().await?;
    Ok(Json(PriceResponse { price }))
}
