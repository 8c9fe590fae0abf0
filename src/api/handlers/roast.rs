use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct RoastRequest {
    pub summary: String,
}

#[derive(Serialize)]
pub struct RoastResponse {
    pub content: String,
}

pub async fn roast(
    State(state): State<AppState>,
    body: Result<Json<RoastRequest>, JsonRejection>,
) -> Result<Json<RoastResponse>, AppError> {
    let Json(req) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected roast request body");
        AppError::BadRequest("Invalid input format.".into())
    })?;

    let content = state.roaster.roast(&req.summary).await?;
    Ok(Json(RoastResponse { content }))
}
