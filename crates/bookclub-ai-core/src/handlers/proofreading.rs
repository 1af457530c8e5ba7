use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::services::proofreading_service::ProofreadingResult;
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReviewPassageRequest {
    pub passage: String,
}

pub async fn review_passage(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReviewPassageRequest>,
) -> Result<Json<ProofreadingResult>, ApiError> {
    let result = state.proofreading.review_passage(&req.passage).await?;
    Ok(Json(result))
}
