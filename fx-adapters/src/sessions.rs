//! In-memory session store with idle expiry.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use fx_types::{SessionData, SessionError, SessionId, SessionStore};

/// Default idle lifetime of a session.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1440);

#[derive(Debug)]
struct Entry {
    data: SessionData,
    last_seen: Instant,
}

/// Sessions live in process memory and vanish after `idle_timeout` without
/// activity. Every successful `load` refreshes the idle clock.
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Entry>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Drops every session idle for longer than the timeout. Returns how many
    /// were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        let now = Instant::now();
        self.sessions
            .retain(|_, e| now.duration_since(e.last_seen) < self.idle_timeout);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!(removed, "purged idle sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self) -> Result<SessionId, SessionError> {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            Entry {
                data: SessionData::default(),
                last_seen: Instant::now(),
            },
        );
        Ok(id)
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let now = Instant::now();
        if let Some(mut entry) = self.sessions.get_mut(id) {
            if now.duration_since(entry.last_seen) < self.idle_timeout {
                entry.last_seen = now;
                return Ok(Some(entry.data.clone()));
            }
        }
        self.sessions
            .remove_if(id, |_, e| now.duration_since(e.last_seen) >= self.idle_timeout);
        Ok(None)
    }

    async fn set_user(&self, id: &SessionId, username: &str) -> Result<(), SessionError> {
        let now = Instant::now();
        self.sessions
            .entry(*id)
            .and_modify(|e| {
                e.data.user = Some(username.to_string());
                e.last_seen = now;
            })
            .or_insert_with(|| Entry {
                data: SessionData {
                    user: Some(username.to_string()),
                },
                last_seen: now,
            });
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError> {
        self.sessions.remove(id);
        Ok(())
    }
}
