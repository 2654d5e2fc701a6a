//! Session store port.

use crate::domain::{SessionData, SessionId};
use crate::error::SessionError;

/// Server-side session storage keyed by the session cookie.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Starts an empty session.
    async fn create(&self) -> Result<SessionId, SessionError>;

    /// Loads a live session, `None` if unknown or expired.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError>;

    /// Marks the session as belonging to `username`.
    async fn set_user(&self, id: &SessionId, username: &str) -> Result<(), SessionError>;

    /// Invalidates the session.
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError>;
}
