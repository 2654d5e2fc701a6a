//! Session cookie handling and CSRF checks.
//!
//! The session id travels in the `FXSESSID` cookie; everything else lives in
//! the [`SessionStore`]. State-changing routes must echo the session's CSRF
//! token in the `X-CSRF-Token` header.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use fx_adapters::security;
use fx_types::{AppError, SessionData, SessionError, SessionId, SessionStore};

pub const SESSION_COOKIE: &str = "FXSESSID";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Intent the CSRF token is minted for.
pub const CSRF_INTENT: &str = "convert";

/// A live session resolved from the request cookie.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    pub data: SessionData,
}

impl CurrentSession {
    pub fn user(&self) -> Option<&str> {
        self.data.user.as_deref()
    }
}

/// Session id from the cookie, if present and well-formed.
pub fn session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)?.value().parse().ok()
}

/// Loads the caller's live session without starting one.
pub async fn load_existing<S: SessionStore>(
    store: &S,
    jar: &CookieJar,
) -> Result<Option<CurrentSession>, SessionError> {
    let Some(id) = session_id(jar) else {
        return Ok(None);
    };
    Ok(store
        .load(&id)
        .await?
        .map(|data| CurrentSession { id, data }))
}

/// Loads the caller's session, starting a fresh one when the cookie is
/// missing, unknown or expired. The returned jar carries the new cookie.
pub async fn load_or_start<S: SessionStore>(
    store: &S,
    jar: CookieJar,
) -> Result<(CookieJar, CurrentSession), SessionError> {
    if let Some(session) = load_existing(store, &jar).await? {
        return Ok((jar, session));
    }

    let id = store.create().await?;
    tracing::debug!(session = %id, "started session");
    let session = CurrentSession {
        id,
        data: SessionData::default(),
    };
    Ok((jar.add(session_cookie(id)), session))
}

fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Expires the session cookie on the client.
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Rejects the request unless `X-CSRF-Token` matches the session's token.
pub fn verify_csrf(secret: &str, session: &SessionId, headers: &HeaderMap) -> Result<(), AppError> {
    let submitted = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !submitted.is_empty()
        && security::verify_csrf_token(secret, session, CSRF_INTENT, submitted)
    {
        Ok(())
    } else {
        tracing::warn!(session = %session, "rejected request with invalid CSRF token");
        Err(AppError::Forbidden("Invalid CSRF token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use fx_adapters::InMemorySessionStore;

    #[test]
    fn test_session_id_from_cookie() {
        let id = SessionId::new();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, id.to_string()));
        assert_eq!(session_id(&jar), Some(id));

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "garbage"));
        assert_eq!(session_id(&jar), None);
        assert_eq!(session_id(&CookieJar::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(SessionId::new()).to_string();
        assert!(cookie.starts_with("FXSESSID="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn test_load_or_start_reuses_live_session() {
        let store = InMemorySessionStore::default();

        let (jar, first) = load_or_start(&store, CookieJar::new()).await.unwrap();
        assert!(jar.get(SESSION_COOKIE).is_some());

        let (_, second) = load_or_start(&store, jar).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_cookie_starts_new_session() {
        let store = InMemorySessionStore::default();
        let stale = SessionId::new();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, stale.to_string()));

        let (_, session) = load_or_start(&store, jar).await.unwrap();
        assert_ne!(session.id, stale);
        assert_eq!(session.user(), None);
    }

    #[test]
    fn test_verify_csrf() {
        let id = SessionId::new();
        let token = security::csrf_token("secret", &id, CSRF_INTENT);

        let mut headers = HeaderMap::new();
        assert!(verify_csrf("secret", &id, &headers).is_err());

        let shouting = HeaderName::from_bytes(b"X-CSRF-TOKEN").unwrap();
        headers.insert(shouting, HeaderValue::from_str(&token).unwrap());
        assert!(verify_csrf("secret", &id, &headers).is_ok());
        assert!(verify_csrf("secret", &SessionId::new(), &headers).is_err());

        headers.insert(CSRF_HEADER, HeaderValue::from_static(""));
        assert!(matches!(
            verify_csrf("secret", &id, &headers),
            Err(AppError::Forbidden(_))
        ));
    }
}
