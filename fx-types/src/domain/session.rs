//! Session identity and the per-request context handed to the service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What a session knows about its visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub user: Option<String>,
}

impl SessionData {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Request-scoped inputs that are not part of the conversion itself.
///
/// Built by the HTTP layer after session checks and passed explicitly into
/// the service, so nothing downstream reads ambient session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user: Option<String>,
    pub accept_language: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_accept_language(mut self, header: impl Into<String>) -> Self {
        self.accept_language = Some(header.into());
        self
    }

    /// The raw locale hint, `en-US` when the client sent none.
    pub fn locale_hint(&self) -> &str {
        self.accept_language.as_deref().unwrap_or("en-US")
    }
}
