use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::domain::SessionId;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum StreamSignal {
    Cancelled { reason: String },
}

/// Lifecycle state of a registered stream. Transitions are monotonic except
/// `Error`, which is terminal-equivalent to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Active,
    Disconnecting,
    Disconnected,
    Error,
}

/// A single registered SSE/streaming connection for a session. Dropping the
/// receiver end (client disconnect) is detected by the handler loop; the
/// registry's job is only to let other parts of the system push a
/// cancellation into every live connection for a session.
#[derive(Clone)]
pub struct StreamHandle {
    pub id: Uuid,
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub status: StreamStatus,
    tx: broadcast::Sender<StreamSignal>,
}

impl StreamHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<StreamSignal> {
        self.tx.subscribe()
    }
}

/// Tracks live streaming connections per session so a meeting-end or
/// explicit disconnect can push a `Cancelled` signal into every handler
/// currently streaming a response. Generalizes the teacher's single global
/// `services/event_bus.rs` broadcast channel into one channel per
/// registered connection, indexed by session.
#[derive(Default)]
pub struct StreamConnectionRegistry {
    handles: DashMap<SessionId, Vec<StreamHandle>>,
}

impl StreamConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session_id: SessionId) -> StreamHandle {
        let (tx, _rx) = broadcast::channel(16);
        let now = Utc::now();
        let handle = StreamHandle {
            id: Uuid::new_v4(),
            session_id: session_id.clone(),
            created_at: now,
            last_activity_at: now,
            status: StreamStatus::Active,
            tx,
        };
        self.handles.entry(session_id).or_default().push(handle.clone());
        handle
    }

    pub fn unregister(&self, session_id: &SessionId, handle_id: Uuid) {
        if let Some(mut entry) = self.handles.get_mut(session_id) {
            entry.retain(|h| h.id != handle_id);
        }
    }

    /// Transitions every handle registered for `session_id` through
    /// `disconnecting` to `disconnected`, broadcasting `Cancelled` in
    /// between. Handles are kept in the registry (not removed) so a
    /// subsequent `ActiveFor` still observes their terminal status. Returns
    /// the number of handles transitioned.
    pub fn disconnect_session(&self, session_id: &SessionId, reason: &str) -> usize {
        let Some(mut handles) = self.handles.get_mut(session_id) else {
            return 0;
        };
        let mut transitioned = 0usize;
        for handle in handles.iter_mut() {
            if handle.status != StreamStatus::Active {
                continue;
            }
            handle.status = StreamStatus::Disconnecting;
            let _ = handle.tx.send(StreamSignal::Cancelled { reason: reason.to_string() });
            handle.status = StreamStatus::Disconnected;
            transitioned += 1;
        }
        transitioned
    }

    pub fn active_for(&self, session_id: &SessionId) -> Vec<StreamHandle> {
        self.handles.get(session_id).map(|entry| entry.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_tracks_active_count_per_session() {
        let registry = StreamConnectionRegistry::new();
        let session_id: SessionId = "session-1".to_string();

        assert_eq!(registry.active_for(&session_id).len(), 0);
        let h1 = registry.register(session_id.clone());
        let _h2 = registry.register(session_id.clone());
        assert_eq!(registry.active_for(&session_id).len(), 2);

        registry.unregister(&session_id, h1.id);
        assert_eq!(registry.active_for(&session_id).len(), 1);
    }

    #[tokio::test]
    async fn disconnect_session_broadcasts_cancellation_to_every_handle() {
        let registry = StreamConnectionRegistry::new();
        let session_id: SessionId = "session-2".to_string();

        let h1 = registry.register(session_id.clone());
        let h2 = registry.register(session_id.clone());
        let mut rx1 = h1.subscribe();
        let mut rx2 = h2.subscribe();

        let transitioned = registry.disconnect_session(&session_id, "meeting ended");
        assert_eq!(transitioned, 2);

        let StreamSignal::Cancelled { reason } = rx1.recv().await.unwrap();
        assert_eq!(reason, "meeting ended");
        let StreamSignal::Cancelled { reason } = rx2.recv().await.unwrap();
        assert_eq!(reason, "meeting ended");

        let handles = registry.active_for(&session_id);
        assert_eq!(handles.len(), 2);
        assert!(handles.iter().all(|h| h.status == StreamStatus::Disconnected));
    }

    #[test]
    fn unregister_on_unknown_session_is_a_no_op() {
        let registry = StreamConnectionRegistry::new();
        registry.unregister(&"ghost".to_string(), Uuid::new_v4());
    }
}
