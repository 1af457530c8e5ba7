use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::database::MeetingRecord;
use crate::meeting::MeetingStatus;
use crate::models::domain::{MeetingId, MeetingType, SessionId};
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub meeting_id: MeetingId,
    pub meeting_type: String,
    pub title: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct EndMeetingExtras {
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Deserialize)]
pub struct EndMeetingRequest {
    pub meeting_type: String,
    #[serde(default)]
    pub extras: EndMeetingExtras,
}

#[derive(Debug, Serialize)]
pub struct EndMeetingResponse {
    pub meeting_id: MeetingId,
    pub discussion_sessions_closed: usize,
}

pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMeetingRequest>,
) -> Result<Json<MeetingRecord>, ApiError> {
    let meeting_type = MeetingType::parse(&req.meeting_type)
        .ok_or_else(|| ApiError::InvalidArgument(format!("unknown meeting type {}", req.meeting_type)))?;

    let record = state
        .repository
        .create_meeting(&req.meeting_id, meeting_type, &req.title)
        .await?;
    state.vector.ensure_collection(&req.meeting_id).await?;

    Ok(Json(record))
}

pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<MeetingId>,
) -> Result<Json<MeetingRecord>, ApiError> {
    Ok(Json(state.repository.get_meeting(&meeting_id).await?))
}

pub async fn end_meeting(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<MeetingId>,
    Json(req): Json<EndMeetingRequest>,
) -> Result<Json<EndMeetingResponse>, ApiError> {
    let meeting_type = MeetingType::parse(&req.meeting_type)
        .ok_or_else(|| ApiError::InvalidArgument(format!("unknown meeting type {}", req.meeting_type)))?;

    let report = state
        .meeting_coordinator
        .end_meeting(&meeting_id, meeting_type, req.extras.session_id.as_ref())
        .await?;
    state.repository.mark_meeting_ended(&meeting_id).await?;

    Ok(Json(EndMeetingResponse {
        meeting_id: report.meeting_id,
        discussion_sessions_closed: report.discussion_sessions_closed,
    }))
}

pub async fn meeting_status(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<MeetingId>,
) -> Result<Json<MeetingStatus>, ApiError> {
    Ok(Json(state.meeting_coordinator.get_meeting_status(&meeting_id).await?))
}

pub async fn list_active_meetings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MeetingId>>, ApiError> {
    Ok(Json(state.meeting_coordinator.list_active_meetings().await?))
}
