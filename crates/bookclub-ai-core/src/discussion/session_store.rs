use std::time::Duration;

use deadpool_redis::{Config as RedisPoolConfig, Pool, Runtime};
use redis::AsyncCommands;

use crate::discussion::types::DiscussionSession;
use crate::models::domain::{MeetingId, SessionId};
use crate::utils::error::ApiError;

fn session_key(session_id: &SessionId) -> String {
    format!("discussion:session:{session_id}")
}

fn active_sessions_key(meeting_id: &MeetingId) -> String {
    format!("discussion:active_sessions:{meeting_id}")
}

/// Source of truth for live discussion sessions. Every read refreshes the
/// key's TTL (sessions stay alive as long as they're actively used); writes
/// always go straight through, never buffered — `SessionCache` is the only
/// layer allowed to short-circuit a read.
pub struct RedisSessionStore {
    pool: Pool,
    ttl: Duration,
}

impl RedisSessionStore {
    pub fn new(redis_url: &str, ttl: Duration) -> Result<Self, ApiError> {
        let cfg = RedisPoolConfig::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| ApiError::Unavailable(format!("redis pool: {e}")))?;
        Ok(Self { pool, ttl })
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, ApiError> {
        self.pool
            .get()
            .await
            .map_err(|e| ApiError::Unavailable(format!("redis pool exhausted: {e}")))
    }

    pub async fn save(&self, session: &DiscussionSession) -> Result<(), ApiError> {
        let mut conn = self.conn().await?;
        let body = serde_json::to_string(session)
            .map_err(|e| ApiError::InternalError(format!("serialize session: {e}")))?;
        let key = session_key(&session.session_id);
        let () = conn
            .set_ex(&key, body, self.ttl.as_secs())
            .await
            .map_err(ApiError::from)?;
        let active_key = active_sessions_key(&session.meeting_id);
        let _: i64 = conn.sadd(&active_key, &session.session_id).await.map_err(ApiError::from)?;
        let () = conn
            .expire(&active_key, self.ttl.as_secs() as i64)
            .await
            .map_err(ApiError::from)?;
        Ok(())
    }

    /// Fetches the session and refreshes its TTL on every successful read —
    /// active use keeps a session alive indefinitely; idle ones expire.
    pub async fn get(&self, session_id: &SessionId) -> Result<Option<DiscussionSession>, ApiError> {
        let mut conn = self.conn().await?;
        let key = session_key(session_id);
        let raw: Option<String> = conn.get(&key).await.map_err(ApiError::from)?;
        let Some(raw) = raw else { return Ok(None) };

        let session: DiscussionSession = serde_json::from_str(&raw)
            .map_err(|e| ApiError::InternalError(format!("deserialize session: {e}")))?;
        let _: bool = conn.expire(&key, self.ttl.as_secs() as i64).await.map_err(ApiError::from)?;
        Ok(Some(session))
    }

    pub async fn delete(&self, session_id: &SessionId, meeting_id: &MeetingId) -> Result<(), ApiError> {
        let mut conn = self.conn().await?;
        let _: i64 = conn.del(session_key(session_id)).await.map_err(ApiError::from)?;
        let _: i64 = conn
            .srem(active_sessions_key(meeting_id), session_id)
            .await
            .map_err(ApiError::from)?;
        Ok(())
    }

    pub async fn active_sessions(&self, meeting_id: &MeetingId) -> Result<Vec<SessionId>, ApiError> {
        let mut conn = self.conn().await?;
        let ids: Vec<String> = conn.smembers(active_sessions_key(meeting_id)).await.map_err(ApiError::from)?;
        Ok(ids)
    }

    /// Reconciles the active-sessions index against reality: any member
    /// whose session key has already expired is dropped from the set. The
    /// index is an approximation (membership survives a session's own TTL
    /// briefly); this is what keeps it converging.
    pub async fn cleanup_expired_sessions(&self, meeting_id: &MeetingId) -> Result<usize, ApiError> {
        let ids = self.active_sessions(meeting_id).await?;
        let mut removed = 0usize;
        let mut conn = self.conn().await?;
        for id in ids {
            let exists: bool = conn.exists(session_key(&id)).await.map_err(ApiError::from)?;
            if !exists {
                let _: i64 = conn
                    .srem(active_sessions_key(meeting_id), &id)
                    .await
                    .map_err(ApiError::from)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub async fn session_stats(&self, meeting_id: &MeetingId) -> Result<SessionStats, ApiError> {
        let active = self.active_sessions(meeting_id).await?;
        Ok(SessionStats {
            meeting_id: meeting_id.clone(),
            active_session_count: active.len(),
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionStats {
    pub meeting_id: MeetingId,
    pub active_session_count: usize,
}
