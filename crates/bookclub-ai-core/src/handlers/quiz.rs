use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::models::domain::MeetingId;
use crate::services::quiz_service::QuizQuestion;
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub topic_hint: String,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
}

fn default_question_count() -> usize {
    5
}

pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<MeetingId>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<Json<Vec<QuizQuestion>>, ApiError> {
    let questions = state
        .quiz
        .generate_quiz(&meeting_id, &req.topic_hint, req.question_count)
        .await?;
    Ok(Json(questions))
}
