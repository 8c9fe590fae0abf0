use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Ops endpoints
    let ops = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    let api = Router::new()
        // Wallet data (behind the admission gate)
        .route("/wallet", get(handlers::wallet::portfolio))
        .route("/wallet/report", get(handlers::wallet::report))
        .route("/wallet/tokens", get(handlers::wallet::tokens))
        // Roast generation
        .route("/roast", post(handlers::roast::roast))
        // Spot price
        .route("/solana-price", get(handlers::price::solana_price));

    // The browser client may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    ops.merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
