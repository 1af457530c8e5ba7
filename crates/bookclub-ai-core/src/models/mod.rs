pub mod domain;

pub use domain::{BookChunk, ChatMessage, MeetingId, MeetingType, Participant, ParticipantId, SessionId, DocumentId};
