use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::gateway::AggregatorError;
use crate::services::roaster::RoastError;
use crate::upstream::CoinGeckoError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimited(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, try again shortly".into(),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<AggregatorError> for AppError {
    fn from(e: AggregatorError) -> Self {
        match e {
            AggregatorError::RateLimited(inner) => AppError::RateLimited(inner.to_string()),
            AggregatorError::NotConfigured => {
                AppError::Configuration("Portfolio provider API key is not configured".into())
            }
            AggregatorError::Upstream { stage, source } => {
                tracing::debug!(stage, error = %source, "Aggregator failure");
                AppError::Upstream("Failed to fetch wallet data".into())
            }
        }
    }
}

impl From<RoastError> for AppError {
    fn from(e: RoastError) -> Self {
        match e {
            RoastError::NotConfigured => {
                AppError::Configuration("Generative model API key is not configured".into())
            }
            RoastError::Model(inner) => {
                tracing::warn!(error = %inner, "Roast model call failed");
                AppError::Upstream("Failed to generate roast".into())
            }
        }
    }
}

impl From<CoinGeckoError> for AppError {
    fn from(e: CoinGeckoError) -> Self {
        tracing::warn!(error = %e, "Spot price fetch failed");
        AppError::Upstream("Failed to fetch Solana price".into())
    }
}
