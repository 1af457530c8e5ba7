use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::discussion::session_store::RedisSessionStore;
use crate::discussion::types::DiscussionSession;
use crate::models::domain::SessionId;
use crate::utils::error::ApiError;

const LOCAL_TTL: Duration = Duration::from_secs(30);

struct Entry {
    session: DiscussionSession,
    cached_at: Instant,
}

/// Short-TTL read-through cache in front of `RedisSessionStore`. Redis
/// remains the source of truth (resolved open question); this layer only
/// saves a round trip for the common case of several turns landing on the
/// same process within a few seconds of each other.
pub struct SessionCache {
    local: DashMap<SessionId, Entry>,
    store: Arc<RedisSessionStore>,
}

impl SessionCache {
    pub fn new(store: Arc<RedisSessionStore>) -> Self {
        Self { local: DashMap::new(), store }
    }

    pub async fn get(&self, session_id: &SessionId) -> Result<Option<DiscussionSession>, ApiError> {
        if let Some(entry) = self.local.get(session_id) {
            if entry.cached_at.elapsed() < LOCAL_TTL {
                return Ok(Some(entry.session.clone()));
            }
        }
        self.local.remove(session_id);

        let fetched = self.store.get(session_id).await?;
        if let Some(session) = &fetched {
            self.local.insert(
                session_id.clone(),
                Entry { session: session.clone(), cached_at: Instant::now() },
            );
        }
        Ok(fetched)
    }

    pub async fn save(&self, session: &DiscussionSession) -> Result<(), ApiError> {
        self.store.save(session).await?;
        self.local.insert(
            session.session_id.clone(),
            Entry { session: session.clone(), cached_at: Instant::now() },
        );
        Ok(())
    }

    pub fn invalidate(&self, session_id: &SessionId) {
        self.local.remove(session_id);
    }

    pub async fn store_delete(
        &self,
        session_id: &SessionId,
        meeting_id: &crate::models::domain::MeetingId,
    ) -> Result<(), ApiError> {
        self.local.remove(session_id);
        self.store.delete(session_id, meeting_id).await
    }
}
