use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};

use crate::discussion::types::{DiscussionSession, DiscussionTurn};
use crate::models::domain::{MeetingId, Participant, SessionId};
use crate::state::AppState;
use crate::stream::StreamSignal;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct StartDiscussionRequest {
    pub session_id: SessionId,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub participant_id: String,
    pub nickname: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct EndDiscussionResponse {
    pub session_id: SessionId,
}

pub async fn start_discussion(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<MeetingId>,
    Json(req): Json<StartDiscussionRequest>,
) -> Result<Json<DiscussionSession>, ApiError> {
    let session = state
        .discussion
        .start_discussion(req.session_id, meeting_id, req.participants)
        .await?;
    Ok(Json(session))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<DiscussionTurn>, ApiError> {
    let turn = state
        .discussion
        .post_message(&session_id, &req.participant_id, &req.nickname, &req.content)
        .await?;
    Ok(Json(turn))
}

pub async fn end_discussion(
    State(state): State<Arc<AppState>>,
    Path((meeting_id, session_id)): Path<(MeetingId, SessionId)>,
) -> Result<Json<EndDiscussionResponse>, ApiError> {
    state.streams.disconnect_session(&session_id, "ended by participant");
    state.discussion.end_discussion(&session_id, &meeting_id).await?;
    Ok(Json(EndDiscussionResponse { session_id }))
}

/// Streams a single discussion turn over SSE: a live connection is
/// registered against the session so `MeetingLifecycleCoordinator` (or an
/// explicit disconnect) can cancel it mid-flight, racing the turn against
/// that cancellation signal the way the teacher's chat-stream handler raced
/// generation against client disconnect.
pub async fn stream_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<PostMessageRequest>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let handle = state.streams.register(session_id.clone());
    let mut cancel_rx = handle.subscribe();
    let discussion = state.discussion.clone();
    let streams = state.streams.clone();
    let handle_id = handle.id;

    let event = tokio::select! {
        result = discussion.post_message(&session_id, &req.participant_id, &req.nickname, &req.content) => {
            match result {
                Ok(turn) => Event::default().event("turn").json_data(&turn).unwrap_or_else(|_| Event::default().event("error")),
                Err(err) => Event::default().event("error").data(err.to_string()),
            }
        }
        signal = cancel_rx.recv() => {
            match signal {
                Ok(StreamSignal::Cancelled { reason }) => Event::default().event("cancelled").data(reason),
                Err(_) => Event::default().event("cancelled").data("stream closed"),
            }
        }
    };

    streams.unregister(&session_id, handle_id);
    Sse::new(stream::once(async move { Ok(event) })).keep_alive(KeepAlive::default())
}
