use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let gate = state.aggregator.gate();
    Json(json!({
        "status": "healthy",
        "admission": {
            "active": gate.active_count().await,
            "tracked": gate.tracked_count().await,
            "capacity": gate.config().requests_per_minute,
        },
        "providers": {
            "portfolio": state.config.moralis_api_key.is_some(),
            "roast": state.config.google_api_key.is_some(),
        },
    }))
}
