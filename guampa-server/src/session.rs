//! Cookie sessions
//!
//! The browser holds an opaque random token in the `guampa_session` cookie;
//! the server maps tokens to user ids in memory. Every request passes
//! through [`resolve_current_user`], which attaches a [`CurrentUser`] for
//! handlers to read.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use guampa_common::db::User;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{db, ApiError, AppState};

/// Cookie holding the session token
pub const SESSION_COOKIE: &str = "guampa_session";

/// How long a session lasts without an explicit logout
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Clone, Copy)]
struct SessionEntry {
    user_id: i64,
    created: Instant,
}

/// Server-side session map: token → user id
///
/// Sessions older than the store's TTL are invisible to lookups. Expired
/// entries are dropped when looked up and swept whenever a session starts,
/// so the map stays bounded by the number of logins within one TTL.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.duration_since(entry.created) >= self.ttl
    }

    /// Start a session for `user_id`, returning its token
    pub async fn create(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        if sessions.len() < before {
            debug!("Dropped {} expired sessions", before - sessions.len());
        }
        sessions.insert(
            token.clone(),
            SessionEntry {
                user_id,
                created: now,
            },
        );
        token
    }

    /// User id for a live session
    pub async fn user_id(&self, token: &str) -> Option<i64> {
        let entry = self.inner.read().await.get(token).copied()?;
        if self.is_expired(&entry, Instant::now()) {
            self.inner.write().await.remove(token);
            return None;
        }
        Some(entry.user_id)
    }

    /// End a session; returns the user id it belonged to
    pub async fn remove(&self, token: &str) -> Option<i64> {
        self.inner.write().await.remove(token).map(|e| e.user_id)
    }

    /// Number of stored sessions, expired ones not yet swept included
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The logged-in user for this request, if any
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// The user, or 403 for anonymous requests
    pub fn require(&self) -> Result<&User, ApiError> {
        self.user()
            .ok_or_else(|| ApiError::Forbidden("Login required".to_string()))
    }
}

/// Session cookie carrying `token`
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie value that makes the browser drop the session cookie
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Start a session for `user` and add its cookie to `jar`
///
/// Any session the jar already carried is ended first.
pub async fn log_in(state: &AppState, jar: CookieJar, user: &User) -> CookieJar {
    if let Some(old) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(old.value()).await;
    }
    let token = state.sessions.create(user.id).await;
    debug!("Session started for {}", user.username);
    jar.add(session_cookie(token))
}

/// End the session named by `jar`, if any, and clear its cookie
pub async fn log_out(state: &AppState, jar: CookieJar) -> CookieJar {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(user_id) = state.sessions.remove(cookie.value()).await {
            debug!("Session ended for user {}", user_id);
        }
    }
    jar.remove(removal_cookie())
}

/// Middleware attaching [`CurrentUser`] to every request
///
/// Unknown tokens and sessions whose user has disappeared resolve to an
/// anonymous request.
pub async fn resolve_current_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut current = CurrentUser::default();

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(user_id) = state.sessions.user_id(cookie.value()).await {
            current = CurrentUser(db::get_user(&state.db, user_id).await?);
        }
    }

    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_lookup_remove() {
        let store = SessionStore::new();
        let token = store.create(7).await;

        assert_eq!(store.user_id(&token).await, Some(7));
        assert_eq!(store.len().await, 1);

        assert_eq!(store.remove(&token).await, Some(7));
        assert_eq!(store.user_id(&token).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_session_is_not_resolved() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        let token = store.create(7).await;

        assert_eq!(store.user_id(&token).await, None);
        assert!(store.is_empty().await, "Expired lookup should drop the entry");
    }

    #[tokio::test]
    async fn test_create_sweeps_expired_sessions() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        for _ in 0..50 {
            store.create(1).await;
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_live_sessions_survive_sweep() {
        let store = SessionStore::new();
        let first = store.create(1).await;
        store.create(2).await;

        assert_eq!(store.user_id(&first).await, Some(1));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = SessionStore::new();
        let a = store.create(1).await;
        let b = store.create(1).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_anonymous_require_is_forbidden() {
        assert!(matches!(
            CurrentUser::default().require(),
            Err(ApiError::Forbidden(_))
        ));
    }
}
