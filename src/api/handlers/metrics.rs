use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    let gate = state.aggregator.gate();
    gauge!("admission_active").set(gate.active_count().await as f64);
    gauge!("admission_tracked").set(gate.tracked_count().await as f64);

    let body = state.metrics_handle.render();
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
